//! Remote persistence for tours.
//!
//! [`RemoteSync`] moves the store's tour to and from the persistence server
//! through a [`TourBackend`]. [`HttpTourBackend`] is the production backend;
//! tests substitute an in-memory one.
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch     | `GET /tours/{id}` |
//! | list all  | `GET /tours` |
//! | list      | `GET /tours/user/{userId}` |
//! | create    | `POST /tours` |
//! | update    | `PUT /tours/{id}` |
//! | delete    | `DELETE /tours/{id}` |
//! | read plan | `GET /tours/{id}/plan` |
//! | save plan | `POST /tours/{id}/plan` |
//!
//! A save writes the tour header first and then its plan. A load reads the
//! header and plan together from the plan endpoint.

mod adapter;
mod backend;
mod error;
mod session;
pub mod wire;

pub use adapter::RemoteSync;
pub use backend::{HttpTourBackend, TourBackend};
pub use error::SyncError;
pub use session::{Session, SessionCache, SessionError, SESSION_FILE};
