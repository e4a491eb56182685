//! Todo application
//!
//! In-memory CRUD over `{id, todo}` records plus a health check and a ping
//! route, all mounted on the router. The store is created by the caller and
//! handed to the handlers, so every test can start from an empty one.

mod handlers;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::router::{RouteError, Router};

/// A stored todo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub todo: String,
}

/// Body accepted by create and patch
#[derive(Debug, Deserialize)]
pub struct TodoRequest {
    pub todo: String,
}

/// Todos keyed by id
#[derive(Debug, Default)]
pub struct TodoStore {
    todos: RwLock<BTreeMap<String, Todo>>,
}

impl TodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, todo: Todo) {
        self.todos.write().insert(todo.id.clone(), todo);
    }

    pub fn get(&self, id: &str) -> Option<Todo> {
        self.todos.read().get(id).cloned()
    }

    /// All todos ordered by id
    pub fn list(&self) -> Vec<Todo> {
        self.todos.read().values().cloned().collect()
    }

    /// Replace the text of an existing todo
    pub fn update(&self, id: &str, text: String) -> Option<Todo> {
        let mut todos = self.todos.write();
        let todo = todos.get_mut(id)?;
        todo.todo = text;
        Some(todo.clone())
    }

    pub fn remove(&self, id: &str) -> Option<Todo> {
        self.todos.write().remove(id)
    }
}

/// Mount the application routes on `router`
pub fn register(router: &mut Router, store: &Arc<TodoStore>) -> Result<(), RouteError> {
    router.get("/health-check", handlers::health_check)?;

    let s = Arc::clone(store);
    router.get("/todos", move |w, req| handlers::list_todos(&s, w, req))?;
    let s = Arc::clone(store);
    router.post("/todos", move |w, req| handlers::create_todo(&s, w, req))?;
    let s = Arc::clone(store);
    router.get("/todos/:id", move |w, req| handlers::get_todo(&s, w, req))?;
    let s = Arc::clone(store);
    router.patch("/todos/:id", move |w, req| handlers::patch_todo(&s, w, req))?;
    let s = Arc::clone(store);
    router.delete("/todos/:id", move |w, req| handlers::delete_todo(&s, w, req))?;

    router.get("/ping/:id/:otherid", handlers::ping)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(id: &str, text: &str) -> Todo {
        Todo {
            id: id.to_string(),
            todo: text.to_string(),
        }
    }

    #[test]
    fn test_store_crud() {
        let store = TodoStore::new();
        assert!(store.list().is_empty());

        store.insert(todo("b", "second"));
        store.insert(todo("a", "first"));
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.list(), vec![todo("a", "first"), todo("b", "second")]);

        assert_eq!(store.update("a", "changed".to_string()), Some(todo("a", "changed")));
        assert_eq!(store.update("zzz", "nope".to_string()), None);
        assert_eq!(store.get("a"), Some(todo("a", "changed")));

        assert_eq!(store.remove("b"), Some(todo("b", "second")));
        assert_eq!(store.remove("b"), None);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_register_mounts_routes_in_order() {
        let mut router = Router::new();
        register(&mut router, &Arc::new(TodoStore::new())).unwrap();

        let templates: Vec<_> = router
            .routes()
            .iter()
            .map(|r| format!("{} {}", r.method(), r.pattern().template()))
            .collect();
        assert_eq!(
            templates,
            [
                "GET /health-check",
                "GET /todos",
                "POST /todos",
                "GET /todos/:id",
                "PATCH /todos/:id",
                "DELETE /todos/:id",
                "GET /ping/:id/:otherid",
            ]
        );
    }
}
