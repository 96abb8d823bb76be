use std::hint::black_box;

use brrtmvc::dispatcher::{Dispatcher, RequestContext};
use brrtmvc::registry::{ActionResult, ActionTable, Controller};
use brrtmvc::request::Request;
use brrtmvc::response::HandlerResponse;
use brrtmvc::router::{Mapper, Route};
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;

struct ZooController;

impl ZooController {
    fn show(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        Ok(HandlerResponse::html(ctx.urlvar("id").unwrap_or_default().to_string()))
    }

    fn delete(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
        Ok(HandlerResponse::redirect("/zoo/list"))
    }
}

impl Controller for ZooController {
    const TYPE_NAME: &'static str = "ZooController";
    fn create() -> Self {
        ZooController
    }
    fn actions() -> ActionTable<Self> {
        ActionTable::new()
            .action("show", Self::show)
            .action("delete", Self::delete)
    }
}

fn routes(map: &mut Mapper) {
    map.connect(Route::new("/").default("controller", "zoo").default("action", "show"));
    map.connect(
        Route::new("/zoo/{id}")
            .default("controller", "zoo")
            .default("action", "delete")
            .requirement("id", r"\d+")
            .methods([Method::DELETE]),
    );
    map.connect(Route::new("/files/{*path}").default("controller", "zoo").default("action", "show"));
    map.connect(Route::new("/{controller}/{action}/{id}").requirement("id", r"\d+"));
    map.connect(Route::new("/{controller}/{action}"));
    map.connect(Route::new("/{controller}"));
}

fn dispatcher() -> Dispatcher {
    Dispatcher::builder()
        .routes(routes)
        .controller::<ZooController>()
        .build()
        .expect("dispatcher")
}

fn bench_route_match(c: &mut Criterion) {
    let d = dispatcher();
    let map = d.mapper();
    let paths = [
        (Method::GET, "/"),
        (Method::GET, "/zoo/show/123"),
        (Method::DELETE, "/zoo/9"),
        (Method::GET, "/files/a/b/c.txt"),
        (Method::GET, "/nowhere/at/all/here"),
    ];
    c.bench_function("route_match", |b| {
        b.iter(|| {
            for (method, path) in paths.iter() {
                black_box(map.match_path(method, path));
            }
        })
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let d = dispatcher();
    c.bench_function("dispatch_show", |b| {
        b.iter(|| black_box(d.dispatch(Request::get("/zoo/show/42"))))
    });
    c.bench_function("dispatch_method_override", |b| {
        b.iter(|| black_box(d.dispatch(Request::post_form("/zoo/9", "_method=DELETE"))))
    });
    c.bench_function("dispatch_not_found", |b| {
        b.iter(|| black_box(d.dispatch(Request::get("/zoo/_private"))))
    });
}

criterion_group!(benches, bench_route_match, bench_dispatch);
criterion_main!(benches);
