// Todo route handlers
// Each handler answers client mistakes with a plain-text error, never a panic

use hyper::StatusCode;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use super::{Todo, TodoRequest, TodoStore};
use crate::http::ResponseWriter;
use crate::logger;
use crate::router::RoutedRequest;

/// Client-facing handler errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TodoError {
    #[error("Invalid JSON Required Todo")]
    InvalidJson,

    #[error("Invalid JSON, No Todo Found")]
    Empty,

    #[error("Todo Not Found")]
    NotFound,
}

impl TodoError {
    /// Reply with this error
    fn respond(&self, w: &mut dyn ResponseWriter, status: StatusCode) {
        w.error(status, &self.to_string());
    }
}

fn parse_body(req: &RoutedRequest<'_>) -> Result<TodoRequest, TodoError> {
    serde_json::from_slice(req.body()).map_err(|e| {
        logger::log_debug(&format!("Rejected todo body: {e}"));
        TodoError::InvalidJson
    })
}

pub fn health_check(w: &mut dyn ResponseWriter, _req: &RoutedRequest<'_>) {
    w.write_header(StatusCode::NO_CONTENT);
}

pub fn list_todos(store: &TodoStore, w: &mut dyn ResponseWriter, _req: &RoutedRequest<'_>) {
    let todos = store.list();
    if todos.is_empty() {
        TodoError::Empty.respond(w, StatusCode::NOT_FOUND);
        return;
    }
    w.json_response(StatusCode::OK, &todos);
}

pub fn create_todo(store: &TodoStore, w: &mut dyn ResponseWriter, req: &RoutedRequest<'_>) {
    let body = match parse_body(req) {
        Ok(body) => body,
        Err(e) => return e.respond(w, StatusCode::BAD_REQUEST),
    };
    if body.todo.is_empty() {
        return TodoError::Empty.respond(w, StatusCode::BAD_REQUEST);
    }

    let todo = Todo {
        id: Uuid::new_v4().to_string(),
        todo: body.todo,
    };
    store.insert(todo.clone());
    w.json_response(StatusCode::ACCEPTED, &todo);
}

pub fn get_todo(store: &TodoStore, w: &mut dyn ResponseWriter, req: &RoutedRequest<'_>) {
    let id = req.param("id").unwrap_or_default();
    match store.get(id) {
        Some(todo) => w.json_response(StatusCode::OK, &todo),
        None => TodoError::NotFound.respond(w, StatusCode::NOT_FOUND),
    }
}

pub fn patch_todo(store: &TodoStore, w: &mut dyn ResponseWriter, req: &RoutedRequest<'_>) {
    let id = req.param("id").unwrap_or_default();
    if store.get(id).is_none() {
        return TodoError::NotFound.respond(w, StatusCode::BAD_REQUEST);
    }
    let body = match parse_body(req) {
        Ok(body) => body,
        Err(e) => return e.respond(w, StatusCode::BAD_REQUEST),
    };

    // removed between the two lookups
    match store.update(id, body.todo) {
        Some(todo) => w.json_response(StatusCode::ACCEPTED, &todo),
        None => TodoError::NotFound.respond(w, StatusCode::BAD_REQUEST),
    }
}

pub fn delete_todo(store: &TodoStore, w: &mut dyn ResponseWriter, req: &RoutedRequest<'_>) {
    let id = req.param("id").unwrap_or_default();
    match store.remove(id) {
        Some(_) => w.write_header(StatusCode::NO_CONTENT),
        None => TodoError::NotFound.respond(w, StatusCode::BAD_REQUEST),
    }
}

#[derive(Serialize)]
struct Ping<'a> {
    id: Option<&'a str>,
    otherid: Option<&'a str>,
    name: Option<&'a str>,
}

pub fn ping(w: &mut dyn ResponseWriter, req: &RoutedRequest<'_>) {
    let ping = Ping {
        id: req.param("id"),
        otherid: req.param("otherid"),
        name: req.query_param("name"),
    };
    w.json_response(StatusCode::OK, &ping);
}

#[cfg(test)]
mod tests {
    use super::super::{register, Todo, TodoStore};
    use crate::http::BufferedResponse;
    use crate::router::Router;
    use hyper::body::Bytes;
    use hyper::header::{ALLOW, CONTENT_TYPE};
    use hyper::{Method, Request, StatusCode};
    use std::sync::Arc;

    fn app() -> (Router, Arc<TodoStore>) {
        let store = Arc::new(TodoStore::new());
        let mut router = Router::new();
        register(&mut router, &store).unwrap();
        (router, store)
    }

    fn call(router: &Router, method: Method, uri: &str, body: &str) -> BufferedResponse {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::from(body.to_string()))
            .unwrap();
        let mut sink = BufferedResponse::new();
        router.dispatch(&req, &mut sink);
        sink
    }

    fn text(sink: &BufferedResponse) -> &str {
        std::str::from_utf8(sink.body()).unwrap()
    }

    fn seed(store: &TodoStore, id: &str, text: &str) {
        store.insert(Todo {
            id: id.to_string(),
            todo: text.to_string(),
        });
    }

    #[test]
    fn test_health_check() {
        let (router, _) = app();
        let res = call(&router, Method::GET, "/health-check", "");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(res.body().is_empty());
    }

    #[test]
    fn test_list_empty_is_not_found() {
        let (router, _) = app();
        let res = call(&router, Method::GET, "/todos", "");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(&res), "Invalid JSON, No Todo Found\n");
    }

    #[test]
    fn test_create_then_list_and_get() {
        let (router, store) = app();
        let res = call(&router, Method::POST, "/todos", r#"{"todo":"buy milk"}"#);
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");

        let created: Todo = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(created.todo, "buy milk");
        assert!(uuid::Uuid::parse_str(&created.id).is_ok());
        assert_eq!(store.list().len(), 1);

        let res = call(&router, Method::GET, "/todos", "");
        assert_eq!(res.status(), StatusCode::OK);
        let listed: Vec<Todo> = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(listed, vec![created.clone()]);

        let res = call(&router, Method::GET, &format!("/todos/{}", created.id), "");
        assert_eq!(res.status(), StatusCode::OK);
        let fetched: Todo = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn test_create_rejects_bad_bodies() {
        let (router, store) = app();

        let res = call(&router, Method::POST, "/todos", "not json");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(&res), "Invalid JSON Required Todo\n");

        let res = call(&router, Method::POST, "/todos", r#"{"todo":""}"#);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(&res), "Invalid JSON, No Todo Found\n");

        assert!(store.list().is_empty());
    }

    #[test]
    fn test_get_missing() {
        let (router, _) = app();
        let res = call(&router, Method::GET, "/todos/nope", "");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(text(&res), "Todo Not Found\n");
    }

    #[test]
    fn test_patch() {
        let (router, store) = app();
        seed(&store, "1", "old");

        let res = call(&router, Method::PATCH, "/todos/1", r#"{"todo":"new"}"#);
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        let updated: Todo = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(updated.todo, "new");
        assert_eq!(store.get("1").unwrap().todo, "new");

        let res = call(&router, Method::PATCH, "/todos/1", "{");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(&res), "Invalid JSON Required Todo\n");

        let res = call(&router, Method::PATCH, "/todos/2", r#"{"todo":"x"}"#);
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(&res), "Todo Not Found\n");
    }

    #[test]
    fn test_delete() {
        let (router, store) = app();
        seed(&store, "1", "gone soon");

        let res = call(&router, Method::DELETE, "/todos/1", "");
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(store.list().is_empty());

        let res = call(&router, Method::DELETE, "/todos/1", "");
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(text(&res), "Todo Not Found\n");
    }

    #[test]
    fn test_wrong_method_on_todo() {
        let (router, _) = app();
        let res = call(&router, Method::PUT, "/todos/1", "");
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, PATCH, DELETE");

        let res = call(&router, Method::DELETE, "/todos", "");
        assert_eq!(res.headers()[ALLOW], "GET, POST");
    }

    #[test]
    fn test_ping_echoes_params() {
        let (router, _) = app();
        let res = call(&router, Method::GET, "/ping/7/9?name=gopher", "");
        assert_eq!(res.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(value["id"], "7");
        assert_eq!(value["otherid"], "9");
        assert_eq!(value["name"], "gopher");
    }

    #[test]
    fn test_ping_decodes_path_and_query() {
        let (router, _) = app();
        let res = call(&router, Method::GET, "/ping/a%20b/9?name=bob%20smith+jr", "");
        assert_eq!(res.status(), StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(value["id"], "a b");
        assert_eq!(value["name"], "bob smith jr");
    }

    #[test]
    fn test_separate_stores_do_not_share_state() {
        let (router_a, store_a) = app();
        let (_, store_b) = app();
        call(&router_a, Method::POST, "/todos", r#"{"todo":"only in a"}"#);
        assert_eq!(store_a.list().len(), 1);
        assert!(store_b.list().is_empty());
    }
}
