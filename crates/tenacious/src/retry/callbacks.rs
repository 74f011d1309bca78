// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use super::OnRetryArgs;

crate::define_fn_wrapper!(Policy<E>(Fn(&E) -> bool));
crate::define_fn_wrapper!(OnRetry<E>(Fn(&E, OnRetryArgs)));
