use http::StatusCode;
use http_body_util::BodyExt;
use serde::Deserialize;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use switchyard_http::protocol::{Body, BoxError, PathParams, Request, Verb};
use switchyard_web::extract::{Data, Form};
use switchyard_web::{DispatchContext, Endpoints, Registry, Routes};
use tracing::Level;

#[derive(Deserialize, Debug)]
pub struct User {
    name: String,
    zip: String,
}

#[derive(Clone, Debug)]
struct RequestId(u64);

#[derive(Default)]
struct Demo {
    served: AtomicU64,
}

impl Endpoints for Demo {
    fn routes(routes: &mut Routes<Self>) {
        routes.get("/", Demo::hello);
        routes.get("/users/*", Demo::show_user);
        routes.post("/users", Demo::create_user);
        routes.get("/count/*", Demo::count).produces(mime::TEXT_PLAIN);
    }

    fn before_each(&self, context: &mut DispatchContext) -> Result<(), BoxError> {
        let id = self.served.fetch_add(1, Ordering::Relaxed);
        context.insert(RequestId(id));
        Ok(())
    }
}

impl Demo {
    fn hello(&self, Data(id): Data<RequestId>) -> String {
        format!("hello world, you are request #{}\r\n", id.0)
    }

    fn show_user(&self, params: PathParams) -> String {
        format!("user {}\r\n", params.get(0).unwrap_or_default())
    }

    // curl -v -d "name=hello&zip=world" http://127.0.0.1:8080/users
    fn create_user(&self, Form(user): Form<User>) -> (StatusCode, String) {
        (StatusCode::CREATED, format!("created {} in {}\r\n", user.name, user.zip))
    }

    fn count(&self, params: PathParams) -> Result<Body, std::num::ParseIntError> {
        let to: u32 = params.get(0).unwrap_or_default().parse()?;
        Ok(Body::producer(None, move |sink: &mut dyn Write| {
            for i in 1..=to {
                writeln!(sink, "{i}")?;
            }
            Ok(())
        })
        .with_mime(mime::TEXT_PLAIN))
    }
}

async fn show(registry: &Arc<Registry>, verb: Verb, path: &'static str, body: Body) {
    let response = registry.dispatch_async(verb, path, move |params| Request::builder(path).params(params).body(body).build()).await;

    println!("{verb} {path} -> {}", response.status());
    for (name, value) in response.headers() {
        println!("  {name}: {}", value.to_str().unwrap_or("<binary>"));
    }
    match response.into_body().collect().await {
        Ok(collected) => print!("{}", String::from_utf8_lossy(&collected.to_bytes())),
        Err(e) => println!("body failed: {e}"),
    }
    println!();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

    let registry = Registry::new();
    registry.register(Demo::default()).unwrap();
    registry.seal();
    let registry = Arc::new(registry);

    show(&registry, Verb::Get, "/", Body::empty()).await;
    show(&registry, Verb::Get, "/users/ada", Body::empty()).await;
    show(&registry, Verb::Post, "/users", Body::bytes("name=hello&zip=world").with_mime(mime::APPLICATION_WWW_FORM_URLENCODED)).await;
    show(&registry, Verb::Get, "/count/5", Body::empty()).await;
    show(&registry, Verb::Get, "/count/many", Body::empty()).await;
    show(&registry, Verb::Delete, "/users", Body::empty()).await;
    show(&registry, Verb::Get, "/nowhere", Body::empty()).await;

    let response = registry.dispatch_method("OPTIONS", "/users", |_| Request::builder("/users").build());
    println!("OPTIONS /users -> {} allow: {:?}", response.status(), response.headers().get(http::header::ALLOW));
}
