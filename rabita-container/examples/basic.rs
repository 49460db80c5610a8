//! Basic example of the Rabita container.

use std::sync::Arc;

use rabita_container::prelude::*;

// === Define your services ===

trait Logger: Send + Sync {
    fn log(&self, msg: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, msg: &str) {
        println!("[LOG] {msg}");
    }
}

struct Database {
    url: String,
    logger: Arc<dyn Logger>,
}

impl Database {
    fn query(&self, sql: &str) -> String {
        self.logger.log(&format!("Executing: {sql}"));
        format!("Results from {}", self.url)
    }
}

struct UserRepository {
    db: Arc<Database>,
}

impl UserRepository {
    fn find_user(&self, id: u64) -> String {
        self.db.query(&format!("SELECT * FROM users WHERE id = {id}"))
    }
}

struct UserService {
    repo: Arc<UserRepository>,
    logger: Arc<dyn Logger>,
}

impl UserService {
    fn get_user(&self, id: u64) -> String {
        self.logger.log(&format!("Getting user {id}"));
        self.repo.find_user(id)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let app = Container::new();

    // Declare the constructible classes and their parameter lists
    app.declare(Blueprint::new("demo::ConsoleLogger", |_| {
        Ok(object(Arc::new(ConsoleLogger) as Arc<dyn Logger>))
    }));
    app.declare(
        Blueprint::new("demo::Database", |args| {
            let logger: Arc<Arc<dyn Logger>> = args.take()?;
            Ok(object(Database {
                url: "postgres://localhost".to_string(),
                logger: (*logger).clone(),
            }))
        })
        .param(Param::class("demo::ConsoleLogger")),
    );
    app.declare(
        Blueprint::new("demo::UserRepository", |args| {
            let db: Arc<Database> = args.take()?;
            Ok(object(UserRepository { db }))
        })
        .param(Param::class("demo::Database")),
    );
    app.declare(
        Blueprint::new("demo::UserService", |args| {
            let repo: Arc<UserRepository> = args.take()?;
            let logger: Arc<Arc<dyn Logger>> = args.take()?;
            Ok(object(UserService {
                repo,
                logger: (*logger).clone(),
            }))
        })
        .param(Param::class("demo::UserRepository"))
        .param(Param::class("demo::ConsoleLogger"))
        .method(
            Method::new("get_user", |receiver, args| {
                let service = receiver.downcast::<UserService>().unwrap();
                let id: Arc<u64> = args.take()?;
                Ok(object(service.get_user(*id)))
            })
            .param(CallParam::plain("id")),
        ),
    );

    // Shared infrastructure as singletons, entry points as aliases
    app.singleton("logger", "demo::ConsoleLogger")?;
    app.singleton("db", "demo::Database")?;
    app.bind("users", "demo::UserService")?;

    // Resolve the whole graph
    let service = app.resolve("users")?;
    let service = service.downcast::<UserService>().unwrap();
    println!("{}", service.get_user(1));

    // Or go through the invocation helper
    let result = app.call(
        "demo::UserService@get_user",
        Arguments::new().named("id", 2u64),
    )?;
    println!("{}", result.downcast::<String>().unwrap());

    Ok(())
}
