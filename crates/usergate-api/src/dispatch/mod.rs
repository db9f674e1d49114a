// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Request dispatch.
//!
//! Routes are declared once through [`DispatchRouter`], which yields the
//! [`RouteTable`] the gate chain consults and the axum router that serves the
//! handlers.

mod pattern;
mod router;
mod routes;
mod table;

pub use pattern::{PathParams, PathPattern, Specificity};
pub use router::{Dispatch, DispatchRouter};
pub use routes::user_routes;
pub use table::{RouteDescriptor, RouteEntry, RouteMatch, RouteRequirement, RouteTable};
