// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub use sqlforge_core::*;
pub use sqlforge_derive_impl::Entity;

/// Core re-exports plus the derive macro.
///
/// ```rust,ignore
/// use sqlforge::prelude::*;
/// ```
pub mod prelude {
    pub use sqlforge_core::prelude::*;
    pub use sqlforge_derive_impl::Entity;
}
