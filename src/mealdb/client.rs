use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::cache::{cache_key, ResponseCache};
use crate::config::MealDbConfig;

/// Upper bound on a random-batch request.
pub const MAX_RANDOM_BATCH: usize = 8;

/// Draw budget per requested meal. The random endpoint can return
/// duplicates or malformed rows, so we over-provision draws; once the
/// budget runs out a short result is returned as-is.
const ATTEMPT_FACTOR: usize = 4;

#[derive(Debug, Error)]
#[error("mealdb request failed: {0}")]
pub struct MealDbError(#[from] reqwest::Error);

/// The upstream recipe API, as a seam so handlers and the batch loop can
/// be driven by fakes in tests.
#[async_trait]
pub trait MealApi: Send + Sync {
    async fn search(&self, term: &str) -> Result<Value, MealDbError>;
    async fn lookup(&self, id: &str) -> Result<Value, MealDbError>;
    async fn random(&self) -> Result<Value, MealDbError>;
    async fn categories(&self) -> Result<Value, MealDbError>;
}

/// HTTP client for TheMealDB with a TTL cache over the deterministic
/// endpoints. The key is embedded in the URL path, so it never appears
/// in query strings or logs beyond the base URL itself.
pub struct MealDbClient {
    http: reqwest::Client,
    base_url: String,
    cache: ResponseCache,
}

impl MealDbClient {
    pub fn new(cfg: &MealDbConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;
        let base_url = format!("{}/{}", cfg.base_url.trim_end_matches('/'), cfg.api_key);
        Ok(Self {
            http,
            base_url,
            cache: ResponseCache::new(Duration::from_secs(cfg.cache_ttl_secs)),
        })
    }

    /// Single fetch path for every endpoint. `cacheable` is the one place
    /// that decides between cache-or-fetch and plain fetch.
    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        cacheable: bool,
    ) -> Result<Value, MealDbError> {
        let url = format!("{}/{}", self.base_url, path);
        if !cacheable {
            return self.fetch(&url, query).await;
        }

        let key = cache_key(&url, query);
        if let Some(hit) = self.cache.get(&key).await {
            debug!(path, "mealdb cache hit");
            return Ok(hit);
        }
        let payload = self.fetch(&url, query).await?;
        self.cache.put(key, payload.clone()).await;
        Ok(payload)
    }

    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> Result<Value, MealDbError> {
        let response = self
            .http
            .get(url)
            .query(query)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MealApi for MealDbClient {
    async fn search(&self, term: &str) -> Result<Value, MealDbError> {
        self.get("search.php", &[("s", term)], true).await
    }

    async fn lookup(&self, id: &str) -> Result<Value, MealDbError> {
        self.get("lookup.php", &[("i", id)], true).await
    }

    async fn random(&self) -> Result<Value, MealDbError> {
        // Never cached: a cached random.php would stop looking random.
        self.get("random.php", &[], false).await
    }

    async fn categories(&self) -> Result<Value, MealDbError> {
        self.get("categories.php", &[], true).await
    }
}

/// Draws distinct random meals from the single-random primitive, which
/// offers no dedup guarantee of its own. Stops at `count` distinct meals
/// or after `count * 4` draws, whichever comes first; a short result is
/// a valid outcome. Meals keep their first-drawn order.
pub async fn random_batch(api: &dyn MealApi, count: usize) -> Result<Vec<Value>, MealDbError> {
    let count = count.clamp(1, MAX_RANDOM_BATCH);
    let max_attempts = count * ATTEMPT_FACTOR;

    let mut seen = HashSet::new();
    let mut meals = Vec::with_capacity(count);
    let mut attempts = 0;

    while meals.len() < count && attempts < max_attempts {
        attempts += 1;

        let payload = api.random().await?;
        let Some(meal) = payload.get("meals").and_then(Value::as_array).and_then(|m| m.first())
        else {
            continue;
        };
        let Some(id) = meal.get("idMeal").and_then(Value::as_str).filter(|s| !s.is_empty())
        else {
            continue;
        };

        if seen.insert(id.to_string()) {
            meals.push(meal.clone());
        }
    }

    Ok(meals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MealDbConfig;
    use axum::{routing::get, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fake upstream that serves a scripted sequence of random payloads,
    /// cycling when exhausted, and counts every draw.
    struct ScriptedApi {
        responses: Vec<Value>,
        calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn new(responses: Vec<Value>) -> Self {
            Self {
                responses,
                calls: AtomicUsize::new(0),
            }
        }

        fn draws(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MealApi for ScriptedApi {
        async fn search(&self, _term: &str) -> Result<Value, MealDbError> {
            unimplemented!("not used by batch tests")
        }
        async fn lookup(&self, _id: &str) -> Result<Value, MealDbError> {
            unimplemented!("not used by batch tests")
        }
        async fn random(&self) -> Result<Value, MealDbError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.responses[n % self.responses.len()].clone())
        }
        async fn categories(&self) -> Result<Value, MealDbError> {
            unimplemented!("not used by batch tests")
        }
    }

    fn meal_payload(id: &str) -> Value {
        json!({"meals": [{"idMeal": id, "strMeal": format!("Meal {id}")}]})
    }

    /// Loopback stand-in for TheMealDB that counts how often each
    /// endpoint is actually fetched.
    async fn spawn_upstream() -> (String, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let search_hits = Arc::new(AtomicUsize::new(0));
        let random_hits = Arc::new(AtomicUsize::new(0));

        let s = search_hits.clone();
        let r = random_hits.clone();
        let app = Router::new()
            .route(
                "/k/search.php",
                get(move || {
                    let s = s.clone();
                    async move {
                        s.fetch_add(1, Ordering::SeqCst);
                        axum::Json(meal_payload("1"))
                    }
                }),
            )
            .route(
                "/k/random.php",
                get(move || {
                    let r = r.clone();
                    async move {
                        r.fetch_add(1, Ordering::SeqCst);
                        axum::Json(meal_payload("2"))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        (format!("http://{addr}"), search_hits, random_hits)
    }

    fn upstream_client(base_url: String) -> MealDbClient {
        MealDbClient::new(&MealDbConfig {
            base_url,
            api_key: "k".into(),
            cache_ttl_secs: 600,
            timeout_secs: 8,
        })
        .expect("client")
    }

    #[tokio::test]
    async fn deterministic_endpoints_fetch_upstream_once_within_ttl() {
        let (base_url, search_hits, _) = spawn_upstream().await;
        let client = upstream_client(base_url);

        let first = client.search("chicken").await.expect("first search");
        let second = client.search("chicken").await.expect("second search");
        assert_eq!(first, second);
        assert_eq!(search_hits.load(Ordering::SeqCst), 1);

        // A different term is a different cache key, so it fetches.
        client.search("beef").await.expect("other term");
        assert_eq!(search_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn random_refetches_on_every_call() {
        let (base_url, _, random_hits) = spawn_upstream().await;
        let client = upstream_client(base_url);

        client.random().await.expect("first random");
        client.random().await.expect("second random");
        assert_eq!(random_hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn collects_distinct_meals_in_draw_order() {
        let api = ScriptedApi::new(vec![
            meal_payload("1"),
            meal_payload("2"),
            meal_payload("1"),
            meal_payload("3"),
        ]);

        let meals = random_batch(&api, 3).await.expect("batch");
        let ids: Vec<&str> = meals
            .iter()
            .map(|m| m["idMeal"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
        assert_eq!(api.draws(), 4);
    }

    #[tokio::test]
    async fn attempt_budget_bounds_duplicate_storms() {
        // Upstream keeps serving the same meal: 2 requested, so at most
        // 8 draws, and the short single-meal result is not an error.
        let api = ScriptedApi::new(vec![meal_payload("7")]);

        let meals = random_batch(&api, 2).await.expect("batch");
        assert_eq!(meals.len(), 1);
        assert_eq!(api.draws(), 8);
    }

    #[tokio::test]
    async fn malformed_draws_are_skipped() {
        let api = ScriptedApi::new(vec![
            json!({"meals": null}),
            json!({"meals": [{"strMeal": "No id"}]}),
            json!({"meals": [{"idMeal": ""}]}),
            meal_payload("42"),
        ]);

        let meals = random_batch(&api, 1).await.expect("batch");
        assert_eq!(meals.len(), 1);
        assert_eq!(meals[0]["idMeal"], "42");
    }

    #[tokio::test]
    async fn count_is_clamped_to_bounds() {
        let api = ScriptedApi::new(vec![
            meal_payload("1"),
            meal_payload("2"),
            meal_payload("3"),
            meal_payload("4"),
            meal_payload("5"),
            meal_payload("6"),
            meal_payload("7"),
            meal_payload("8"),
            meal_payload("9"),
            meal_payload("10"),
        ]);

        let meals = random_batch(&api, 50).await.expect("batch");
        assert_eq!(meals.len(), MAX_RANDOM_BATCH);

        let api = ScriptedApi::new(vec![meal_payload("1")]);
        let meals = random_batch(&api, 0).await.expect("batch");
        assert_eq!(meals.len(), 1);
    }
}
