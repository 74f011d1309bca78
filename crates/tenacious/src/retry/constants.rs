// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Name attached to log events when none is configured.
pub(super) const DEFAULT_NAME: &str = "retry";
