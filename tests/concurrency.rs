//! Overlapping navigations: only the most recent one is ever committed.

use std::sync::{Arc, Mutex};

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use transition_router::navigation::{HandlerArgs, HandlerResult, NavigateOptions, Submission};
use transition_router::Route;

mod common;
use common::{drain, router, Gate};

/// Handler that waits on `gate` before returning `value`.
fn gated(
    gate: &Gate,
    value: &'static str,
) -> impl Fn(HandlerArgs) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static {
    let gate = gate.clone();
    move |_| {
        let gate = gate.clone();
        async move {
            gate.pass().await;
            Ok(json!(value).into())
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_superseded_navigation_is_invisible_when_it_resolves_last() {
    let slow = Gate::new();
    let (router, history) = router(
        vec![Route::new("/").id("root").children([
            Route::new("slow").id("slow").loader(gated(&slow, "slow")),
            Route::new("fast")
                .id("fast")
                .loader(|_| async { Ok(json!("fast").into()) }),
        ])],
        "/",
    );
    router.initialize().await.unwrap();
    let mut rx = router.subscribe();

    let first = tokio::spawn({
        let router = router.clone();
        async move { router.navigate("/slow", NavigateOptions::new()).await }
    });
    slow.wait_started().await;

    router.navigate("/fast", NavigateOptions::new()).await.unwrap();
    slow.release();

    let outcome = first.await.unwrap().unwrap();
    assert!(outcome.is_superseded());

    let state = router.state();
    assert_eq!(state.location.pathname, "/fast");
    assert_eq!(state.loader_data("fast"), Some(&json!("fast")));
    assert!(state.loader_data("slow").is_none());
    assert!(state.is_idle());

    let entries: Vec<_> = history.entries().into_iter().map(|l| l.pathname).collect();
    assert_eq!(entries, vec!["/", "/fast"]);
    assert!(drain(&mut rx)
        .iter()
        .all(|s| s.location.pathname != "/slow"));
}

#[tokio::test]
async fn test_superseded_navigation_is_invisible_when_it_resolves_first() {
    let first_gate = Gate::new();
    let second_gate = Gate::new();
    let (router, _) = router(
        vec![Route::new("/").id("root").children([
            Route::new("one").id("one").loader(gated(&first_gate, "one")),
            Route::new("two").id("two").loader(gated(&second_gate, "two")),
        ])],
        "/",
    );
    router.initialize().await.unwrap();

    let first = tokio::spawn({
        let router = router.clone();
        async move { router.navigate("/one", NavigateOptions::new()).await }
    });
    first_gate.wait_started().await;

    let second = tokio::spawn({
        let router = router.clone();
        async move { router.navigate("/two", NavigateOptions::new()).await }
    });
    second_gate.wait_started().await;

    first_gate.release();
    assert!(first.await.unwrap().unwrap().is_superseded());
    assert_eq!(router.state().location.pathname, "/");
    assert_eq!(router.state().transition.kind(), "normalLoad");

    second_gate.release();
    let outcome = second.await.unwrap().unwrap();
    let state = outcome.state().unwrap();
    assert_eq!(state.location.pathname, "/two");
    assert_eq!(state.loader_data("two"), Some(&json!("two")));
    assert!(state.loader_data("one").is_none());
}

#[tokio::test]
async fn test_loader_signal_is_cancelled_on_supersede() {
    let gate = Gate::new();
    let signal: Arc<Mutex<Option<CancellationToken>>> = Arc::new(Mutex::new(None));
    let slot = signal.clone();
    let inner_gate = gate.clone();
    let (router, _) = router(
        vec![Route::new("/").id("root").children([
            Route::new("watch").id("watch").loader(move |args| {
                let slot = slot.clone();
                let gate = inner_gate.clone();
                async move {
                    *slot.lock().unwrap() = Some(args.signal.clone());
                    gate.pass().await;
                    Ok(json!(null).into())
                }
            }),
            Route::new("elsewhere").id("elsewhere"),
        ])],
        "/",
    );
    router.initialize().await.unwrap();

    let first = tokio::spawn({
        let router = router.clone();
        async move { router.navigate("/watch", NavigateOptions::new()).await }
    });
    gate.wait_started().await;
    let token = signal.lock().unwrap().clone().unwrap();
    assert!(!token.is_cancelled());

    router.navigate("/elsewhere", NavigateOptions::new()).await.unwrap();
    assert!(token.is_cancelled());
    assert!(first.await.unwrap().unwrap().is_superseded());
    assert_eq!(router.state().location.pathname, "/elsewhere");
}

#[tokio::test]
async fn test_superseded_action_result_is_discarded() {
    let gate = Gate::new();
    let (router, _) = router(
        vec![Route::new("/").id("root").children([
            Route::new("form").id("form").action(gated(&gate, "saved")),
            Route::new("other").id("other"),
        ])],
        "/",
    );
    router.initialize().await.unwrap();

    let submit = tokio::spawn({
        let router = router.clone();
        async move {
            router
                .navigate(
                    "/form",
                    NavigateOptions::new().submission(Submission::post([("a", "1")])),
                )
                .await
        }
    });
    gate.wait_started().await;
    assert_eq!(router.state().transition.kind(), "actionSubmission");

    router.navigate("/other", NavigateOptions::new()).await.unwrap();
    gate.release();

    assert!(submit.await.unwrap().unwrap().is_superseded());
    let state = router.state();
    assert_eq!(state.location.pathname, "/other");
    assert!(state.action_data.is_none());
    assert!(state.is_idle());
}

#[tokio::test]
async fn test_many_rapid_navigations_commit_only_the_last() {
    let (router, _) = router(
        vec![Route::new("/").id("root").child(
            Route::new("items/:id")
                .id("item")
                .loader(|args| async move {
                    tokio::task::yield_now().await;
                    Ok(json!(args.params["id"].clone()).into())
                }),
        )],
        "/",
    );
    router.initialize().await.unwrap();

    let mut handles = Vec::new();
    for i in 0..10 {
        let router = router.clone();
        handles.push(tokio::spawn(async move {
            router
                .navigate(format!("/items/{}", i), NavigateOptions::new())
                .await
        }));
        tokio::task::yield_now().await;
    }

    let mut committed = 0;
    for handle in handles {
        if handle.await.unwrap().unwrap().state().is_some() {
            committed += 1;
        }
    }

    let state = router.state();
    assert!(committed >= 1);
    assert!(state.is_idle());
    let id = state.matches[1].params["id"].clone();
    assert_eq!(state.loader_data("item"), Some(&json!(id)));
}
