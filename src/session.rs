//! The single mutable "current solution" cell and everything hanging off it.
//!
//! A solve is split in two halves so the model stays editable while the
//! request is out: [`Session::begin_solve`] hands back a ticket carrying the
//! wire request, and [`Session::finish_solve`] applies the outcome only if the
//! ticket still matches the active context. The classified solution, its
//! tree cursor and its artifact handle live in one value that is replaced
//! or dropped as a whole.

use std::time::Duration;

use log::{debug, info, warn};

use crate::client::SolveTransport;
use crate::config::Config;
use crate::convert::model_to_solve_request;
use crate::domain::artifact::{ArtifactManager, DisplaySurface, ResourceHandle, DEFAULT_REPLAY_DELAY};
use crate::domain::matrix::MatrixModel;
use crate::domain::method::{DisplayMode, SolveMethod};
use crate::domain::response::Solution;
use crate::domain::status::translate_status;
use crate::domain::tree::{DecisionNode, TreeNavigator};
use crate::error::Result;
use crate::models::{SolveReply, SolveRequest};

/// Status line while a request is out.
pub const SOLVING_STATUS: &str = "Solving...";

/// Proof of an initiated solve. The outcome is applied only while this
/// ticket is the in-flight one and the method has not changed since.
#[derive(Debug, Clone)]
pub struct SolveTicket {
    id: u64,
    epoch: u64,
    method: SolveMethod,
    request: SolveRequest,
}

impl SolveTicket {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn method(&self) -> SolveMethod {
        self.method
    }

    pub fn request(&self) -> &SolveRequest {
        &self.request
    }
}

struct CurrentSolution<S: DisplaySurface> {
    solution: Solution,
    navigator: TreeNavigator,
    artifact: ArtifactManager<S>,
}

/// What the result area should show right now.
#[derive(Debug, Clone, Copy)]
pub enum ResultView<'a> {
    /// Nothing solved and nothing to report
    Idle,
    /// Only a status line (solving, transport failure, rejected response)
    Status { status_line: &'a str },
    /// The solver reported an error; every facet is suppressed
    SolverError {
        status_line: &'a str,
        message: &'a str,
    },
    /// Flat result panel for primal-style and dual methods
    Flat {
        status_line: &'a str,
        mode: DisplayMode,
        solution: &'a Solution,
        artifact: Option<&'a ResourceHandle>,
    },
    /// Decision tree view for branch-and-bound
    Tree {
        status_line: &'a str,
        solution: &'a Solution,
        tree: Option<&'a DecisionNode>,
        selected: Option<&'a DecisionNode>,
    },
}

pub struct Session<S: DisplaySurface + Clone> {
    model: MatrixModel,
    method: SolveMethod,
    surface: S,
    replay_delay: Duration,
    current: Option<CurrentSolution<S>>,
    status_line: String,
    in_flight: Option<u64>,
    next_ticket: u64,
    epoch: u64,
}

impl<S: DisplaySurface + Clone> Session<S> {
    pub fn new(surface: S) -> Self {
        Session {
            model: MatrixModel::new(),
            method: SolveMethod::default(),
            surface,
            replay_delay: DEFAULT_REPLAY_DELAY,
            current: None,
            status_line: String::new(),
            in_flight: None,
            next_ticket: 0,
            epoch: 0,
        }
    }

    pub fn with_config(surface: S, config: &Config) -> Self {
        let mut session = Session::new(surface);
        session.method = config.method;
        session.replay_delay = config.replay_delay;
        session
    }

    pub fn model(&self) -> &MatrixModel {
        &self.model
    }

    /// Editing stays available while a solve is in flight.
    pub fn model_mut(&mut self) -> &mut MatrixModel {
        &mut self.model
    }

    pub fn method(&self) -> SolveMethod {
        self.method
    }

    /// Switching method drops the current solution and makes any in-flight
    /// response stale.
    pub fn set_method(&mut self, method: SolveMethod) {
        if method == self.method {
            return;
        }
        info!("method changed: {} -> {}", self.method, method);
        self.method = method;
        self.epoch += 1;
        self.current = None;
        self.status_line.clear();
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// True while the solve action should be disabled.
    pub fn is_solving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a solve. Returns `None` while another solve is still in flight.
    pub fn begin_solve(&mut self) -> Option<SolveTicket> {
        if let Some(id) = self.in_flight {
            debug!("solve {} still in flight, ignoring new request", id);
            return None;
        }
        self.next_ticket += 1;
        let ticket = SolveTicket {
            id: self.next_ticket,
            epoch: self.epoch,
            method: self.method,
            request: model_to_solve_request(&self.model, self.method),
        };
        info!("solve {} initiated with method {}", ticket.id, ticket.method);
        self.in_flight = Some(ticket.id);
        self.current = None;
        self.status_line = SOLVING_STATUS.to_string();
        Some(ticket)
    }

    /// Apply the outcome of `ticket`. Returns `false` when the outcome was
    /// stale and discarded.
    pub fn finish_solve(&mut self, ticket: SolveTicket, outcome: Result<SolveReply>) -> bool {
        if self.in_flight == Some(ticket.id) {
            self.in_flight = None;
        }
        if ticket.epoch != self.epoch || ticket.id != self.next_ticket {
            info!("discarding stale response for solve {}", ticket.id);
            return false;
        }

        match outcome.and_then(|reply| {
            let solution = Solution::classify(reply.solution)?;
            Ok((reply.status, solution))
        }) {
            Ok((status, solution)) => {
                self.status_line = translate_status(&status);
                info!("solve {} applied: {}", ticket.id, self.status_line);
                self.install(solution);
            }
            Err(e) => {
                warn!("solve {} failed: {}", ticket.id, e);
                self.status_line = e.status_line();
            }
        }
        true
    }

    /// Run a whole solve against `transport`.
    pub async fn solve<T: SolveTransport>(&mut self, transport: &T) -> bool {
        let Some(ticket) = self.begin_solve() else {
            return false;
        };
        let outcome = transport.solve(ticket.request()).await;
        self.finish_solve(ticket, outcome)
    }

    fn install(&mut self, solution: Solution) {
        // the old artifact handle goes before the new one is issued
        self.current = None;

        let mut navigator = TreeNavigator::new();
        if let Some(tree) = solution.tree() {
            navigator.load(tree);
        }
        let mut artifact = ArtifactManager::with_replay_delay(self.surface.clone(), self.replay_delay);
        if let Some(encoded) = solution.graph_base64() {
            if let Err(e) = artifact.load(encoded) {
                warn!("ignoring animated artifact: {}", e);
            }
        }
        self.current = Some(CurrentSolution {
            solution,
            navigator,
            artifact,
        });
    }

    /// Back to the starting model with nothing solved.
    pub fn reset(&mut self) {
        self.model.reset();
        self.current = None;
        self.status_line.clear();
    }

    pub fn solution(&self) -> Option<&Solution> {
        self.current.as_ref().map(|c| &c.solution)
    }

    pub fn tree(&self) -> Option<&DecisionNode> {
        self.solution().and_then(Solution::tree)
    }

    pub fn select_node(&mut self, id: &str) -> bool {
        let Some(current) = self.current.as_mut() else {
            return false;
        };
        match current.solution.tree() {
            Some(tree) => current.navigator.select(tree, id),
            None => false,
        }
    }

    pub fn selected_node(&self) -> Option<&DecisionNode> {
        let current = self.current.as_ref()?;
        current.navigator.selected(current.solution.tree()?)
    }

    pub fn artifact(&self) -> Option<&ResourceHandle> {
        self.current.as_ref().and_then(|c| c.artifact.current())
    }

    pub fn artifact_bytes(&self) -> Option<&[u8]> {
        self.current.as_ref().and_then(|c| c.artifact.bytes())
    }

    pub async fn replay_artifact(&mut self) -> Option<&ResourceHandle> {
        match self.current.as_mut() {
            Some(current) => current.artifact.replay().await,
            None => None,
        }
    }

    pub fn view(&self) -> ResultView<'_> {
        let status_line = self.status_line.as_str();
        let Some(current) = self.current.as_ref() else {
            if status_line.is_empty() {
                return ResultView::Idle;
            }
            return ResultView::Status { status_line };
        };
        let solution = &current.solution;
        if let Some(message) = solution.error_message() {
            return ResultView::SolverError {
                status_line,
                message,
            };
        }
        match self.method.display_mode() {
            DisplayMode::Tree => {
                let tree = solution.tree();
                ResultView::Tree {
                    status_line,
                    solution,
                    tree,
                    selected: tree.and_then(|t| current.navigator.selected(t)),
                }
            }
            mode => ResultView::Flat {
                status_line,
                mode,
                solution,
                artifact: current.artifact.current(),
            },
        }
    }
}
