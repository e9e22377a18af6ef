use servant::{arguments, ClassDef, Container, Signature, TypeCatalog, TypeKey};
use std::sync::Arc;

// 1. Define the abstraction (the trait)
trait Logger: Send + Sync {
  fn log(&self, message: &str);
}

// 2. Define a concrete implementation
struct ConsoleLogger;
impl Logger for ConsoleLogger {
  fn log(&self, message: &str) {
    println!("[CONSOLE LOG]: {}", message);
  }
}

// 3. Define a service that depends on the abstraction
struct ReportService {
  logger: Arc<dyn Logger>,
  title: String,
}

impl ReportService {
  fn generate_report(&self) {
    self.logger.log(&format!("Starting report '{}'.", self.title));
    // ... logic to generate report ...
    self.logger.log("Finished report generation.");
  }
}

fn main() -> servant::Result<()> {
  // --- Declaration ---

  // The catalog knows how to build each type and which traits it implements.
  let catalog = Arc::new(TypeCatalog::new());
  catalog
    .register(
      ClassDef::<ConsoleLogger>::new()
        .implicit_constructor(|| ConsoleLogger)
        .implements::<dyn Logger>(|logger| logger as Arc<dyn Logger>),
    )
    .register(ClassDef::<ReportService>::new().constructor(
      Signature::new()
        .service::<dyn Logger>("logger")
        .optional_value::<String>("title"),
      |args| {
        Ok(ReportService {
          logger: args.service::<dyn Logger>(0)?,
          title: args
            .opt_arg::<String>(1)?
            .map_or_else(|| "untitled".to_string(), |title| (*title).clone()),
        })
      },
    ));

  // --- Wiring ---

  // Every request for `dyn Logger` is served by one shared ConsoleLogger.
  let container = Container::new(catalog);
  container
    .wire(TypeKey::of::<dyn Logger>())
    .with_concrete(TypeKey::of::<ConsoleLogger>())?
    .singleton(true);
  container.compose("reports", TypeKey::of::<ReportService>());

  // --- Resolution and Usage ---
  println!("Resolving the high-level service...");
  let report_service = container.get_as::<ReportService>("reports")?;
  report_service.generate_report();

  // Explicit arguments take precedence; the logger is still autowired.
  let quarterly = container.make_as::<ReportService>(arguments![title = String::from("Q3")])?;
  quarterly.generate_report();

  Ok(())
}
