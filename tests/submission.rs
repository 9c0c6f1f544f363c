//! Form submissions: actions, GET submissions, post-action revalidation.

use serde_json::json;

use transition_router::navigation::{
    FormMethod, HistoryAction, NavigateOptions, NavigationError, RouteError, RouteResponse,
    Submission, TransitionState,
};
use transition_router::Route;

mod common;
use common::{count, counted, counter, drain, router};

fn kinds(states: &[std::sync::Arc<transition_router::RouterState>]) -> Vec<&'static str> {
    states.iter().map(|s| s.transition.kind()).collect()
}

#[tokio::test]
async fn test_action_success_revalidates_every_loader() {
    let root_calls = counter();
    let todos_calls = counter();
    let (router, history) = router(
        vec![Route::new("/")
            .id("root")
            .loader(counted(&root_calls, json!("root")))
            .child(
                Route::new("todos/:list")
                    .id("todos")
                    .loader(counted(&todos_calls, json!(["milk"])))
                    .action(|args| async move {
                        Ok(json!({
                            "created": args.request.form_value("title"),
                            "method": args.request.method.as_str(),
                            "list": args.params.get("list"),
                        })
                        .into())
                    }),
            )],
        "/todos/home",
    );
    router.initialize().await.unwrap();
    let mut rx = router.subscribe();

    router
        .navigate(
            "/todos/home",
            NavigateOptions::new().submission(Submission::post([("title", "eggs")])),
        )
        .await
        .unwrap();

    let state = router.state();
    assert!(state.is_idle());
    assert_eq!(
        state.action_data("todos"),
        Some(&json!({"created": "eggs", "method": "POST", "list": "home"}))
    );
    assert_eq!(count(&root_calls), 2);
    assert_eq!(count(&todos_calls), 2);
    assert_eq!(history.entries().len(), 2);
    assert_eq!(
        kinds(&drain(&mut rx)),
        vec!["actionSubmission", "actionReload", "idle"]
    );

    router.navigate("/", NavigateOptions::new()).await.unwrap();
    assert!(router.state().action_data.is_none());
}

#[tokio::test]
async fn test_get_submission_updates_search_without_action() {
    let (router, _) = router(
        vec![Route::new("/").id("root").child(
            Route::new("search")
                .id("search")
                .loader(|args| async move { Ok(json!(args.request.query_value("q")).into()) }),
        )],
        "/search",
    );
    router.initialize().await.unwrap();
    let mut rx = router.subscribe();

    router
        .navigate(
            "/search",
            NavigateOptions::new().submission(Submission::get([("q", "rust")])),
        )
        .await
        .unwrap();

    let state = router.state();
    assert_eq!(state.location.search, "?q=rust");
    assert_eq!(state.loader_data("search"), Some(&json!("rust")));
    assert!(state.action_data.is_none());

    let states = drain(&mut rx);
    assert_eq!(states[0].transition.kind(), "loaderSubmission");
    assert_eq!(states[0].transition.state(), TransitionState::Submitting);
    assert!(states.last().unwrap().is_idle());
}

#[tokio::test]
async fn test_action_exception_skips_loaders_below_boundary() {
    let root_calls = counter();
    let projects_calls = counter();
    let project_calls = counter();
    let (router, _) = router(
        vec![Route::new("/")
            .id("root")
            .loader(counted(&root_calls, json!("root")))
            .child(
                Route::new("projects")
                    .id("projects")
                    .error_boundary()
                    .loader(counted(&projects_calls, json!("projects")))
                    .child(
                        Route::new(":pid")
                            .id("project")
                            .loader(counted(&project_calls, json!("project")))
                            .action(|_| async { Err(RouteError::message("denied")) }),
                    ),
            )],
        "/",
    );
    router.initialize().await.unwrap();

    router
        .navigate(
            "/projects/1",
            NavigateOptions::new().submission(Submission::post([("name", "x")])),
        )
        .await
        .unwrap();

    let state = router.state();
    assert!(state.is_idle());
    assert_eq!(state.exception("projects").unwrap().to_string(), "denied");
    assert!(state.action_data.is_none());
    assert_eq!(count(&project_calls), 0);
    assert_eq!(count(&projects_calls), 0);
    // Routes above the boundary are revalidated after the mutation.
    assert_eq!(count(&root_calls), 2);
    assert_eq!(state.loader_data("root"), Some(&json!("root")));
}

#[tokio::test]
async fn test_action_redirect_short_circuits_to_submission_redirect() {
    let todo_calls = counter();
    let (router, history) = router(
        vec![Route::new("/").id("root").children([
            Route::new("new")
                .id("new")
                .action(|_| async { Ok(RouteResponse::redirect("/todos/1").into()) }),
            Route::new("todos/:id")
                .id("todo")
                .loader(counted(&todo_calls, json!({"id": 1}))),
        ])],
        "/",
    );
    router.initialize().await.unwrap();
    let mut rx = router.subscribe();

    router
        .navigate(
            "/new",
            NavigateOptions::new().submission(Submission::post([("title", "milk")])),
        )
        .await
        .unwrap();

    let state = router.state();
    assert_eq!(state.location.pathname, "/todos/1");
    assert_eq!(state.action, HistoryAction::Replace);
    assert!(state.action_data.is_none());
    assert_eq!(count(&todo_calls), 1);

    let entries: Vec<_> = history.entries().into_iter().map(|l| l.pathname).collect();
    assert_eq!(entries, vec!["/todos/1"]);
    assert_eq!(
        kinds(&drain(&mut rx)),
        vec!["actionSubmission", "submissionRedirect", "idle"]
    );
}

#[tokio::test]
async fn test_index_route_action_targeting() {
    let (router, _) = router(
        vec![Route::new("/").id("root").child(
            Route::new("todos")
                .id("todos")
                .action(|_| async { Ok(json!("parent").into()) })
                .child(
                    Route::index()
                        .id("todos-index")
                        .action(|_| async { Ok(json!("index").into()) }),
                ),
        )],
        "/",
    );
    router.initialize().await.unwrap();
    let post = || NavigateOptions::new().submission(Submission::post([("a", "1")]));

    router.navigate("/todos", post()).await.unwrap();
    assert_eq!(router.state().action_data("todos"), Some(&json!("parent")));

    router.navigate("/todos?index", post()).await.unwrap();
    assert_eq!(router.state().action_data("todos-index"), Some(&json!("index")));
    assert!(router.state().action_data("todos").is_none());
}

#[tokio::test]
async fn test_other_mutating_methods_use_the_action() {
    let (router, _) = router(
        vec![Route::new("/").id("root").child(
            Route::new("items/:id")
                .id("item")
                .action(|args| async move { Ok(json!(args.request.method.as_str()).into()) }),
        )],
        "/",
    );
    router.initialize().await.unwrap();

    for method in [FormMethod::Put, FormMethod::Patch, FormMethod::Delete] {
        router
            .navigate(
                "/items/3",
                NavigateOptions::new().submission(Submission::new(method, [("k", "v")])),
            )
            .await
            .unwrap();
        assert_eq!(router.state().action_data("item"), Some(&json!(method.as_str())));
    }
}

#[tokio::test]
async fn test_submission_to_route_without_action_is_an_error() {
    let (router, history) = router(
        vec![Route::new("/").id("root").child(Route::new("about").id("about"))],
        "/",
    );
    router.initialize().await.unwrap();

    let err = router
        .navigate(
            "/about",
            NavigateOptions::new().submission(Submission::post([("a", "1")])),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, NavigationError::MissingAction { ref route_id } if route_id == "about"));
    assert!(router.state().is_idle());
    assert_eq!(router.state().location.pathname, "/");
    assert_eq!(history.entries().len(), 1);
}

#[tokio::test]
async fn test_hash_change_after_action_clears_action_data() {
    let (router, _) = router(
        vec![Route::new("/").id("root").child(
            Route::new("form")
                .id("form")
                .loader(|_| async { Ok(json!("page").into()) })
                .action(|_| async { Ok(json!("saved").into()) }),
        )],
        "/form",
    );
    router.initialize().await.unwrap();

    router
        .navigate(
            "/form",
            NavigateOptions::new().submission(Submission::post([("a", "1")])),
        )
        .await
        .unwrap();
    assert_eq!(router.state().action_data("form"), Some(&json!("saved")));

    router.navigate("#section", NavigateOptions::new()).await.unwrap();
    let state = router.state();
    assert_eq!(state.location.hash, "#section");
    assert!(state.action_data.is_none());
    assert_eq!(state.loader_data("form"), Some(&json!("page")));
}
