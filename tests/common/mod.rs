#![allow(dead_code)]

use anyhow::{anyhow, Context};
use brrtmvc::dispatcher::{Dispatcher, RequestContext};
use brrtmvc::registry::{ActionResult, ActionTable, Controller};
use brrtmvc::response::HandlerResponse;
use brrtmvc::router::{Mapper, Route};
use brrtmvc::templates::Templates;
use http::{Method, StatusCode};
use minijinja::context;
use serde_json::json;

/// Blog controller exercising every dispatcher outcome.
pub struct BlogController {
    calls: usize,
}

impl BlogController {
    fn index(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        ctx.render("blog/index.html", context! { page => ctx.param("page").unwrap_or("1") })
    }

    fn show(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        let id = ctx.urlvar("id").context("show needs an id")?;
        Ok(HandlerResponse::html(format!("post {id}")))
    }

    /// Echo what the action observed about its request.
    fn delete(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        Ok(HandlerResponse::json(
            StatusCode::OK,
            &json!({
                "id": ctx.urlvar("id"),
                "transport_method": ctx.method().as_str(),
                "routed_method": ctx.routing().method().as_str(),
                "override_visible": ctx.request().body.contains("_method"),
                "confirm": ctx.param("confirm"),
            }),
        ))
    }

    fn calls(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
        self.calls += 1;
        Ok(HandlerResponse::html(self.calls.to_string()))
    }

    fn missing_template(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        ctx.render("blog/gone.html", ())
    }

    fn broken_template(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        ctx.render("blog/broken.html", context! { value => "a" })
    }

    fn page(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        ctx.render("blog/page.html", ())
    }

    fn fail(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
        Err(anyhow!("database down"))
    }

    fn back_home(&mut self, ctx: &mut RequestContext<'_>) -> ActionResult {
        let url = ctx.url_for("home", &[]).context("home route")?;
        Ok(ctx.redirect_to(&url))
    }

    fn _secret(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
        Ok(HandlerResponse::html("secret"))
    }
}

impl Controller for BlogController {
    const TYPE_NAME: &'static str = "BlogController";

    fn create() -> Self {
        BlogController { calls: 0 }
    }

    fn actions() -> ActionTable<Self> {
        ActionTable::new()
            .action("index", Self::index)
            .action("show", Self::show)
            .action("delete", Self::delete)
            .action("calls", Self::calls)
            .action("missing_template", Self::missing_template)
            .action("broken_template", Self::broken_template)
            .action("page", Self::page)
            .action("fail", Self::fail)
            .action("back_home", Self::back_home)
            .action("_secret", Self::_secret)
    }
}

pub struct HomeController;

impl HomeController {
    fn index(&mut self, _ctx: &mut RequestContext<'_>) -> ActionResult {
        Ok(HandlerResponse::html("home"))
    }
}

impl Controller for HomeController {
    const TYPE_NAME: &'static str = "HomeController";

    fn create() -> Self {
        HomeController
    }

    fn actions() -> ActionTable<Self> {
        ActionTable::new().action("index", Self::index)
    }
}

/// Routes used across the integration tests.
pub fn routes(map: &mut Mapper) {
    map.connect(
        Route::new("/")
            .name("home")
            .default("controller", "home")
            .default("action", "index"),
    );
    map.connect(
        Route::new("/blog/{id}")
            .default("controller", "blog")
            .default("action", "delete")
            .requirement("id", r"\d+")
            .methods([Method::DELETE]),
    );
    // Points at a controller nobody registered.
    map.connect(
        Route::new("/legacy")
            .default("controller", "legacy")
            .default("action", "index"),
    );
    // Matches but names no action.
    map.connect(Route::new("/raw/{slug}").default("slug", "x"));
    map.connect(Route::new("/{controller}/{action}/{id}"));
    map.connect(Route::new("/{controller}/{action}"));
    map.connect(Route::new("/{controller}"));
}

pub fn templates() -> Templates {
    let mut templates = Templates::new();
    templates
        .add("blog/index.html", "<h1>Blog page {{ page }}</h1>")
        .unwrap();
    templates
        .add("blog/broken.html", "{{ value + 1 }}")
        .unwrap();
    templates
        .add("blog/page.html", "{% include 'blog/sidebar.html' %}")
        .unwrap();
    templates
}

pub fn dispatcher() -> Dispatcher {
    Dispatcher::builder()
        .routes(routes)
        .controller::<BlogController>()
        .controller::<HomeController>()
        .templates(templates())
        .build()
        .unwrap()
}

pub fn body_json(resp: &HandlerResponse) -> serde_json::Value {
    serde_json::from_str(resp.body_str()).unwrap()
}
