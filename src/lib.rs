//! # LP Workbench
//!
//! Client-side state engine for building linear/integer programs and
//! inspecting what a remote solve service returns for them.
//!
//! ## Example
//!
//! ```no_run
//! use lp_workbench::{HandleRegistry, Row, Session, SolveMethod, SolverClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SolverClient::new("http://127.0.0.1:8000/")?;
//!     let mut session = Session::new(HandleRegistry::new());
//!
//!     let model = session.model_mut();
//!     model.set_coefficient(Row::Objective, 0, "3");
//!     model.set_coefficient(Row::Objective, 1, "5");
//!     model.set_coefficient(Row::Constraint(0), 0, "1");
//!     model.set_rhs(0, "4");
//!
//!     session.set_method(SolveMethod::Simplex);
//!     session.solve(&client).await;
//!     println!("{}", lp_workbench::render::render_view(&session.view()));
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod models;
pub mod render;
pub mod session;
pub mod shell;

pub use client::{SolveTransport, SolverClient};
pub use config::Config;
pub use domain::artifact::{ArtifactManager, DisplaySurface, HandleRegistry, ResourceHandle};
pub use domain::matrix::{MatrixModel, ObjectiveSense, Relation, Row, Token};
pub use domain::method::{DisplayMode, SolveMethod};
pub use domain::response::{Facet, FacetKind, Solution};
pub use domain::tree::{DecisionNode, NodeStatus, Selection, TreeNavigator};
pub use error::{ClientError, Result};
pub use models::{SolveReply, SolveRequest};
pub use session::{ResultView, Session, SolveTicket};
