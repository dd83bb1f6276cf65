//! End-to-end dispatch tests over a real listener.

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use treemux::http::{handler_fn, middleware_fn, request_id, Next, X_REQUEST_ID};
use treemux::routing::{Dispatcher, Options, RequestParamsExt, RouteRegistrar};

mod common;

fn echo(label: &'static str) -> treemux::Handler {
    handler_fn(move |req: Request<Body>| async move {
        let params: Vec<String> = req
            .params()
            .map(|p| p.iter().map(|(k, v)| format!("{k}={v}")).collect())
            .unwrap_or_default();
        format!("{label} {}", params.join(","))
    })
}

#[tokio::test]
async fn test_precedence_over_http() {
    let dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.get("/users/static", echo("static"), &[]).unwrap();
    dispatcher.get("/users/:id", echo("param"), &[]).unwrap();
    dispatcher.get("/users/*rest", echo("wildcard"), &[]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher).await;
    let client = common::client();

    let body = client
        .get(format!("http://{addr}/users/static"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "static ");

    let body = client
        .get(format!("http://{addr}/users/42"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "param id=42");

    let body = client
        .get(format!("http://{addr}/users/a/b/c"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "wildcard rest=a/b/c");

    shutdown.trigger();
}

#[tokio::test]
async fn test_not_found_and_method_not_allowed() {
    let dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.get("/items", echo("items"), &[]).unwrap();
    dispatcher.put("/items", echo("items"), &[]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher).await;
    let client = common::client();

    let res = client.get(format!("http://{addr}/nothing")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client.delete(format!("http://{addr}/items")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "GET, HEAD, PUT");

    shutdown.trigger();
}

#[tokio::test]
async fn test_static_route_for_other_method_does_not_shadow_param() {
    let dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.post("/users/new", echo("create"), &[]).unwrap();
    dispatcher.get("/users/:id", echo("show"), &[]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher).await;
    let client = common::client();

    let res = client.get(format!("http://{addr}/users/new")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "show id=new");

    let res = client.post(format!("http://{addr}/users/new")).send().await.unwrap();
    assert_eq!(res.text().await.unwrap(), "create ");

    let res = client.delete(format!("http://{addr}/users/new")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()["allow"], "POST");

    shutdown.trigger();
}

#[tokio::test]
async fn test_trailing_slash_policy_over_http() {
    let dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.get("/items", echo("get"), &[]).unwrap();
    dispatcher.options("/items", echo("options"), &[]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/items/?sort=asc"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()["location"], "/items?sort=asc");

    let res = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/items/"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "options ");

    shutdown.trigger();
}

#[tokio::test]
async fn test_middleware_order_over_http() {
    let events = Arc::new(Mutex::new(Vec::<String>::new()));
    let recorder = |name: &'static str| {
        let events = Arc::clone(&events);
        middleware_fn(move |req, next: Next| {
            let events = Arc::clone(&events);
            async move {
                events.lock().unwrap().push(format!("{name}-enter"));
                let res = next.call(req).await;
                events.lock().unwrap().push(format!("{name}-exit"));
                res
            }
        })
    };

    let handler_events = Arc::clone(&events);
    let handler = handler_fn(move |_req| {
        let events = Arc::clone(&handler_events);
        async move {
            events.lock().unwrap().push("H".to_string());
            "done"
        }
    });

    let mut dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.use_middleware([request_id(), recorder("A")]);
    dispatcher.get("/ordered", handler, &[recorder("B")]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher).await;
    let res = common::client()
        .get(format!("http://{addr}/ordered"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key(X_REQUEST_ID.as_str()));
    assert_eq!(
        *events.lock().unwrap(),
        vec!["A-enter", "B-enter", "H", "B-exit", "A-exit"]
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_routes_added_while_serving() {
    let dispatcher = Dispatcher::new(Options::default()).unwrap();
    dispatcher.get("/first", echo("first"), &[]).unwrap();

    let (addr, shutdown) = common::start_server(dispatcher.clone()).await;
    let client = common::client();

    let res = client.get(format!("http://{addr}/second")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    dispatcher.get("/second", echo("second"), &[]).unwrap();

    let res = client.get(format!("http://{addr}/second")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "second ");

    shutdown.trigger();
}
