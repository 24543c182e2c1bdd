use core::cell::RefCell;

use log::{info, warn};

use crate::{
    app::{ConfigStore, EngineMetrics},
    config::{APP_NAME, APP_VERSION},
    core::net::http::{HandlerError, HandlerResult, Request, Response, Router, StaticFiles},
    domain::{
        dto::{ConfigDto, ConfigPatch, MetricsDto, VersionDto},
        ports::{ConfigStorage, FileSystem},
    },
};

/// Everything the API handlers need
pub struct ApiContext<'a, S: ConfigStorage, F: FileSystem + ?Sized> {
    pub store: &'a ConfigStore,
    pub storage: RefCell<S>,
    pub metrics: &'a EngineMetrics,
    pub static_files: StaticFiles<'a, F>,
}

impl<'a, S: ConfigStorage, F: FileSystem + ?Sized> ApiContext<'a, S, F> {
    pub fn new(
        store: &'a ConfigStore,
        storage: S,
        metrics: &'a EngineMetrics,
        static_files: StaticFiles<'a, F>,
    ) -> Self {
        Self {
            store,
            storage: RefCell::new(storage),
            metrics,
            static_files,
        }
    }
}

/// Routes of the `/api/v1` surface with the static files as fallback
pub fn api_router<'a, S: ConfigStorage, F: FileSystem + ?Sized>() -> Router<ApiContext<'a, S, F>> {
    Router::new()
        .get("/api/v1/version", get_version::<S, F>)
        .get("/api/v1/config", get_config::<S, F>)
        .post("/api/v1/config", post_config::<S, F>)
        .get("/api/v1/metrics", get_metrics::<S, F>)
        .on_not_found(serve_static::<S, F>)
}

fn get_version<S: ConfigStorage, F: FileSystem + ?Sized>(
    _ctx: &ApiContext<'_, S, F>,
    _request: &Request<'_>,
    response: &mut Response<'_>,
) -> HandlerResult {
    response.json(&VersionDto {
        app: APP_NAME,
        version: APP_VERSION,
    })?;
    Ok(())
}

fn get_config<S: ConfigStorage, F: FileSystem + ?Sized>(
    ctx: &ApiContext<'_, S, F>,
    _request: &Request<'_>,
    response: &mut Response<'_>,
) -> HandlerResult {
    response.json(&ConfigDto::from(&ctx.store.snapshot()))?;
    Ok(())
}

/// Merge the body into the store and persist it.
///
/// A body that is missing or not a JSON object is not an error: the current
/// config is returned unchanged.
fn post_config<S: ConfigStorage, F: FileSystem + ?Sized>(
    ctx: &ApiContext<'_, S, F>,
    request: &Request<'_>,
    response: &mut Response<'_>,
) -> HandlerResult {
    let Some(patch) = ConfigPatch::from_json(request.body()) else {
        warn!("http: unparseable config body, returning current config");
        response.json(&ConfigDto::from(&ctx.store.snapshot()))?;
        return Ok(());
    };

    ctx.store.update(&patch);
    let mut storage = ctx
        .storage
        .try_borrow_mut()
        .map_err(|_| HandlerError::Internal("config storage is busy"))?;
    let persisted = ctx.store.persist(&mut *storage);
    info!("http: config updated");

    response.json(&ConfigDto::from(&persisted))?;
    Ok(())
}

fn get_metrics<S: ConfigStorage, F: FileSystem + ?Sized>(
    ctx: &ApiContext<'_, S, F>,
    _request: &Request<'_>,
    response: &mut Response<'_>,
) -> HandlerResult {
    response.json(&MetricsDto {
        avgtick_ms: ctx.metrics.avg_tick_ms(),
    })?;
    Ok(())
}

fn serve_static<'c, S: ConfigStorage, F: FileSystem + ?Sized>(
    ctx: &'c ApiContext<'_, S, F>,
    request: &Request<'_>,
    response: &mut Response<'c>,
) -> HandlerResult {
    ctx.static_files.serve(request, response)
}
