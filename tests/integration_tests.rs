use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::time::Duration;

use lp_workbench::models::SolveRequest;
use lp_workbench::render::render_view;
use lp_workbench::{
    ClientError, Config, HandleRegistry, ObjectiveSense, Relation, ResultView, Row, Session,
    SolveMethod, SolveTransport, SolverClient,
};

const GIF_B64: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

/// Stand-in for the solve service. The requested method picks the reply.
async fn fake_solve(body: web::Json<Value>) -> impl Responder {
    let request = body.into_inner();
    let method = request["method"].as_str().unwrap_or_default().to_string();
    match method.as_str() {
        "simplex" => HttpResponse::Ok().json(json!({
            "status": "optimal",
            "solution": {
                "Z": 36.0,
                "x1": 2.0,
                "x2": 6.0,
                "graph_base64": GIF_B64,
                "iterations": [
                    {
                        "phase": "Simplex",
                        "iteration": 1,
                        "headers": ["x1", "x2", "RHS"],
                        "rows": [
                            {"label": "Z", "values": [-3, -5, 0]},
                            {"label": "s1", "values": [1, 0, 4]}
                        ],
                        "pivot_info": {"row": 0, "col": 1}
                    }
                ]
            }
        })),
        "branch_and_bound" => HttpResponse::Ok().json(json!({
            "status": "optimal",
            "solution": {
                "Z": 20.0,
                "integer_solution": {"Z": 20.0, "x1": 2.0, "x2": 3.0},
                "tree_data": {
                    "id": "P0",
                    "status": "processing",
                    "solution": {"Z": 21.5, "x1": 2.5, "x2": 3.0},
                    "children": [
                        {
                            "id": "P0.1",
                            "status": "integer",
                            "branch_info": "x1 <= 2",
                            "solution": {"Z": 20.0, "x1": 2.0, "x2": 3.0},
                            "children": []
                        },
                        {
                            "id": "P0.2",
                            "status": "infeasible",
                            "branch_info": "x1 >= 3",
                            "children": []
                        }
                    ]
                }
            }
        })),
        "dual" => HttpResponse::BadRequest().json(json!({"error": "Bad input"})),
        "big_m" => HttpResponse::InternalServerError().body("boom"),
        "graphical" => HttpResponse::Ok()
            .content_type("application/json")
            .body("not json"),
        "two_phase" => HttpResponse::Ok().json(json!({
            "status": "infeasible",
            "solution": {"error": "The problem has no feasible region"}
        })),
        // echo what arrived so the wire form can be checked
        _ => HttpResponse::Ok().json(json!({
            "status": "Optimal",
            "solution": {
                "Z": request["objective_function"].as_array().map(|c| c.len()).unwrap_or(0),
                "sense": request["objective"],
                "first_rhs": request["constraints"][0]["rhs"],
                "first_sign": request["constraints"][0]["sign"]
            }
        })),
    }
}

struct FakeSolver {
    base_url: String,
}

impl FakeSolver {
    fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake solver");
        let port = listener.local_addr().expect("local addr").port();
        let server = HttpServer::new(|| App::new().route("/api/solve/", web::post().to(fake_solve)))
            .workers(1)
            .disable_signals()
            .listen(listener)
            .expect("listen")
            .run();
        tokio::spawn(server);
        FakeSolver {
            base_url: format!("http://127.0.0.1:{}/", port),
        }
    }

    fn client(&self) -> SolverClient {
        SolverClient::with_timeout(&self.base_url, Duration::from_secs(5)).expect("client")
    }
}

fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn filled_session(registry: HandleRegistry) -> Session<HandleRegistry> {
    let mut session = Session::new(registry);
    let model = session.model_mut();
    model.set_coefficient(Row::Objective, 0, "3");
    model.set_coefficient(Row::Objective, 1, "5");
    model.set_coefficient(Row::Constraint(0), 0, "1");
    model.set_rhs(0, "4");
    session
}

#[tokio::test]
async fn test_client_posts_to_solve_path() {
    let solver = FakeSolver::start();
    let client = solver.client();
    assert!(client.solve_url().as_str().ends_with("/api/solve/"));

    let mut session = filled_session(HandleRegistry::new());
    session.set_method(SolveMethod::Simplex);
    let ticket = session.begin_solve().expect("ticket");
    let reply = client.solve(ticket.request()).await.expect("reply");
    assert_eq!(reply.status, "optimal");
    assert_eq!(reply.solution["Z"], json!(36.0));
}

#[tokio::test]
async fn test_wire_form_reaches_service() {
    let solver = FakeSolver::start();
    let mut session = filled_session(HandleRegistry::new());
    session.model_mut().set_objective_sense(ObjectiveSense::Minimize);
    session.model_mut().set_relation(0, Relation::GreaterOrEqual);
    session.model_mut().add_variable();

    assert!(session.solve(&solver.client()).await);
    assert_eq!(session.status_line(), "Optimal solution found");

    let solution = session.solution().expect("solution");
    assert_eq!(solution.objective_value(), Some(&json!(3)));
    assert_eq!(solution.variables["sense"], json!("min"));
    assert_eq!(solution.variables["first_rhs"], json!(4.0));
    assert_eq!(solution.variables["first_sign"], json!(">="));
}

#[tokio::test]
async fn test_simplex_solve_populates_flat_view() {
    let solver = FakeSolver::start();
    let registry = HandleRegistry::new();
    let mut session = filled_session(registry.clone());
    session.set_method(SolveMethod::Simplex);

    assert!(session.solve(&solver.client()).await);
    assert!(!session.is_solving());
    assert_eq!(session.status_line(), "Optimal solution found");

    let handle = session.artifact().cloned().expect("artifact handle");
    assert_eq!(handle.mime, "image/gif");
    assert!(registry.is_live(&handle));
    assert_eq!(registry.live_count(), 1);

    match session.view() {
        ResultView::Flat { solution, .. } => {
            let names: Vec<&str> = solution.variables.keys().map(|k| k.as_str()).collect();
            assert_eq!(names, vec!["x1", "x2"]);
            assert_eq!(solution.iterations().map(|i| i.len()), Some(1));
        }
        other => panic!("expected flat view, got {:?}", other),
    }

    let text = render_view(&session.view());
    assert!(text.contains("Optimal Solution (OPTIMAL)"));
    assert!(text.contains("Optimal value (Z) = 36.0000"));
    assert!(text.contains("x1 = 2.00, x2 = 6.00"));
    assert!(text.contains("Simplex - Step 1"));
    assert!(text.contains("[-5]"));
}

#[tokio::test]
async fn test_replay_and_replacement_release_handles() {
    let solver = FakeSolver::start();
    let client = solver.client();
    let registry = HandleRegistry::new();
    let mut session = filled_session(registry.clone());
    session.set_method(SolveMethod::Simplex);
    session.solve(&client).await;

    let first = session.artifact().cloned().expect("first handle");
    let second = session.replay_artifact().await.cloned().expect("replayed handle");
    assert_ne!(first, second);
    assert!(!registry.is_live(&first));
    assert!(registry.is_live(&second));
    assert_eq!(registry.live_count(), 1);

    // a solve without a graph leaves nothing behind
    session.set_method(SolveMethod::BranchAndBound);
    session.solve(&client).await;
    assert!(session.artifact().is_none());
    assert_eq!(registry.live_count(), 0);
}

#[tokio::test]
async fn test_branch_and_bound_tree_navigation() {
    let solver = FakeSolver::start();
    let mut session = filled_session(HandleRegistry::new());
    session.set_method(SolveMethod::BranchAndBound);
    assert!(session.solve(&solver.client()).await);

    let tree = session.tree().expect("tree");
    assert_eq!(tree.label(), "Root");
    assert_eq!(session.selected_node().map(|n| n.id.as_str()), Some("P0"));

    assert!(session.select_node("P0.1"));
    assert_eq!(session.selected_node().map(|n| n.id.as_str()), Some("P0.1"));
    assert!(!session.select_node("P9"));
    assert_eq!(session.selected_node().map(|n| n.id.as_str()), Some("P0.1"));

    let text = render_view(&session.view());
    assert!(text.contains("Decision tree (Branch & Bound)"));
    assert!(text.contains("> 1 (x1 <= 2) [integer]"));
    assert!(text.contains("Node P0.1 details"));
    assert!(text.contains("Status: Integer (leaf)"));
    assert!(text.contains("Optimal integer solution:"));
    assert!(text.contains("x2: 3.0000"));
}

#[tokio::test]
async fn test_api_error_sets_status_line() {
    let solver = FakeSolver::start();
    let mut session = filled_session(HandleRegistry::new());
    session.set_method(SolveMethod::Dual);
    assert!(session.solve(&solver.client()).await);
    assert_eq!(session.status_line(), "Error: Bad input");
    assert!(session.solution().is_none());

    session.set_method(SolveMethod::BigM);
    session.solve(&solver.client()).await;
    assert_eq!(session.status_line(), "Error: Something went wrong.");
}

#[tokio::test]
async fn test_solver_error_field_suppresses_facets() {
    let solver = FakeSolver::start();
    let mut session = filled_session(HandleRegistry::new());
    session.set_method(SolveMethod::TwoPhase);
    session.solve(&solver.client()).await;

    assert_eq!(session.status_line(), "Infeasible solution");
    match session.view() {
        ResultView::SolverError { message, .. } => {
            assert_eq!(message, "The problem has no feasible region")
        }
        other => panic!("expected solver error view, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_failure() {
    let client = SolverClient::with_timeout(unused_url(), Duration::from_secs(2)).expect("client");
    let mut session = filled_session(HandleRegistry::new());

    let ticket = session.begin_solve().expect("ticket");
    let outcome = client.solve(ticket.request()).await;
    assert!(matches!(outcome, Err(ClientError::Connection(_))));

    session.finish_solve(ticket, outcome);
    assert_eq!(session.status_line(), "Error: connection failed.");
    assert!(!session.is_solving());
}

#[tokio::test]
async fn test_stale_reply_after_method_change_is_dropped() {
    let solver = FakeSolver::start();
    let client = solver.client();
    let mut session = Session::with_config(HandleRegistry::new(), &Config::default());
    session.set_method(SolveMethod::Simplex);

    let ticket = session.begin_solve().expect("ticket");
    assert!(session.begin_solve().is_none());
    let request: SolveRequest = ticket.request().clone();
    let outcome = SolveTransport::solve(&client, &request).await;

    session.set_method(SolveMethod::Graphical);
    assert!(!session.finish_solve(ticket, outcome));
    assert!(session.solution().is_none());
    assert_eq!(session.status_line(), "");
}

#[tokio::test]
async fn test_undecodable_success_body_is_parse_error() {
    let solver = FakeSolver::start();
    let mut session = filled_session(HandleRegistry::new());
    session.set_method(SolveMethod::Graphical);

    let ticket = session.begin_solve().expect("ticket");
    let outcome = solver.client().solve(ticket.request()).await;
    assert!(matches!(outcome, Err(ClientError::Parse(_))));

    session.finish_solve(ticket, outcome);
    assert!(session.status_line().starts_with("Error: Failed to parse response"));
    assert!(session.solution().is_none());
}
