//! Route table
//!
//! Patterns are `/`-separated segments. A segment is either a literal, or a
//! placeholder:
//!
//! - `{name}` matches any single non-empty segment
//! - `{name:int}` matches a single segment made of ASCII digits
//! - `{*name}` matches the rest of the path, and must be the last segment
//!
//! Malformed placeholders are matched literally.

use alloc::vec::Vec;

use log::debug;

use super::{HandlerResult, HttpMethod, Request, Response};
use crate::config::MAX_ROUTE_PARAMS;

/// Captured `(name, value)` pairs of a matched route
pub type Params<'r> = heapless::Vec<(&'static str, &'r str), MAX_ROUTE_PARAMS>;

/// Route handler.
///
/// The response may borrow from the context, which is how static files are
/// served without copying.
pub type Handler<C> =
    for<'c> fn(&'c C, &Request<'_>, &mut Response<'c>) -> HandlerResult;

/// Runs before routing. Returning `false` sends the response as the
/// filter left it and skips the route table.
pub type RequestFilter<C> =
    for<'c> fn(&'c C, &Request<'_>, &mut Response<'c>) -> bool;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment {
    Literal(&'static str),
    Any(&'static str),
    Int(&'static str),
    Tail(&'static str),
}

impl Segment {
    fn parse(raw: &'static str, is_last: bool) -> Self {
        let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) else {
            return Segment::Literal(raw);
        };
        if inner.is_empty() || inner.contains(['{', '}']) {
            return Segment::Literal(raw);
        }
        if let Some(name) = inner.strip_prefix('*') {
            return if is_last && !name.is_empty() {
                Segment::Tail(name)
            } else {
                Segment::Literal(raw)
            };
        }
        match inner.split_once(':') {
            Some((name, "int")) if !name.is_empty() => Segment::Int(name),
            Some(_) => Segment::Literal(raw),
            None => Segment::Any(inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    raw: &'static str,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn new(raw: &'static str) -> Self {
        let trimmed = raw.strip_prefix('/').unwrap_or(raw);
        let count = trimmed.split('/').count();
        let segments = trimmed
            .split('/')
            .enumerate()
            .map(|(index, segment)| Segment::parse(segment, index + 1 == count))
            .collect();
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &'static str {
        self.raw
    }

    /// Match `path` and capture the placeholders
    pub fn matches<'r>(&self, path: &'r str) -> Option<Params<'r>> {
        let mut params = Params::new();
        let mut rest = Some(path.strip_prefix('/')?);

        for segment in &self.segments {
            let current = rest?;
            if let Segment::Tail(name) = *segment {
                params.push((name, current)).ok()?;
                return Some(params);
            }
            let (head, tail) = match current.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (current, None),
            };
            match *segment {
                Segment::Literal(literal) if literal == head => {}
                Segment::Any(name) if !head.is_empty() => {
                    params.push((name, head)).ok()?;
                }
                Segment::Int(name)
                    if !head.is_empty() && head.bytes().all(|b| b.is_ascii_digit()) =>
                {
                    params.push((name, head)).ok()?;
                }
                _ => return None,
            }
            rest = tail;
        }

        rest.is_none().then_some(params)
    }
}

struct Route<C> {
    method: HttpMethod,
    pattern: RoutePattern,
    handler: Handler<C>,
}

/// Ordered route table over a handler context `C`.
///
/// Routes are tried in registration order, the first match wins.
pub struct Router<C> {
    routes: Vec<Route<C>>,
    on_request: Option<RequestFilter<C>>,
    not_found: Handler<C>,
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            on_request: None,
            not_found: default_not_found::<C>,
        }
    }

    #[must_use]
    pub fn route(mut self, method: HttpMethod, pattern: &'static str, handler: Handler<C>) -> Self {
        self.routes.push(Route {
            method,
            pattern: RoutePattern::new(pattern),
            handler,
        });
        self
    }

    #[must_use]
    pub fn get(self, pattern: &'static str, handler: Handler<C>) -> Self {
        self.route(HttpMethod::Get, pattern, handler)
    }

    #[must_use]
    pub fn post(self, pattern: &'static str, handler: Handler<C>) -> Self {
        self.route(HttpMethod::Post, pattern, handler)
    }

    /// Filter every request before it is routed
    #[must_use]
    pub fn on_request(mut self, filter: RequestFilter<C>) -> Self {
        self.on_request = Some(filter);
        self
    }

    /// Handler for requests no route matches
    #[must_use]
    pub fn on_not_found(mut self, handler: Handler<C>) -> Self {
        self.not_found = handler;
        self
    }

    /// First route for `method` whose pattern equals or matches `path`
    pub fn find<'r>(
        &self,
        method: HttpMethod,
        path: &'r str,
    ) -> Option<(Handler<C>, Params<'r>)> {
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                if route.pattern.as_str() == path {
                    return Some((route.handler, Params::new()));
                }
                route.pattern.matches(path).map(|params| (route.handler, params))
            })
    }

    /// Run the matching handler, or the not-found handler
    pub fn dispatch<'c>(
        &self,
        context: &'c C,
        request: &mut Request<'_>,
        response: &mut Response<'c>,
    ) -> HandlerResult {
        if let Some(filter) = self.on_request {
            if !filter(context, request, response) {
                debug!("http: {} filtered", request.path());
                return Ok(());
            }
        }
        match self.find(request.method(), request.path()) {
            Some((handler, params)) => {
                request.set_params(params);
                handler(context, request, response)
            }
            None => {
                debug!("http: no route for {} {}", request.method().as_str(), request.path());
                (self.not_found)(context, request, response)
            }
        }
    }
}

fn default_not_found<C>(
    _context: &C,
    _request: &Request<'_>,
    response: &mut Response<'_>,
) -> HandlerResult {
    response.error(404, "Not Found");
    Ok(())
}
