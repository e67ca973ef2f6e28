use fahrplan_core::Route;
use tokio::sync::RwLock;

use super::repo_error::RepositoryError;

pub trait RouteRepository {
    async fn get_routes(&self) -> Result<Vec<Route>, RepositoryError>;
    async fn get_route(&self, route_id: &str) -> Result<Route, RepositoryError>;
    async fn add_route(&self, route: Route) -> Result<Route, RepositoryError>;
}

/// Routes live in memory for the lifetime of the process, in insertion
/// order (the client preselects the first listed route).
pub struct InMemoryRouteRepository {
    routes: RwLock<Vec<Route>>,
}

impl InMemoryRouteRepository {
    pub fn new(seed: Vec<Route>) -> Self {
        Self {
            routes: RwLock::new(seed),
        }
    }
}

impl RouteRepository for InMemoryRouteRepository {
    async fn get_routes(&self) -> Result<Vec<Route>, RepositoryError> {
        Ok(self.routes.read().await.clone())
    }

    async fn get_route(&self, route_id: &str) -> Result<Route, RepositoryError> {
        self.routes
            .read()
            .await
            .iter()
            .find(|route| route.id == route_id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("route '{}'", route_id)))
    }

    async fn add_route(&self, route: Route) -> Result<Route, RepositoryError> {
        let mut routes = self.routes.write().await;
        if let Some(existing) = routes.iter_mut().find(|r| r.id == route.id) {
            *existing = route.clone();
        } else {
            routes.push(route.clone());
        }
        Ok(route)
    }
}
