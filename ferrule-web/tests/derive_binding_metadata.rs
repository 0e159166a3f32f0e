use ferrule_web::prelude::*;
use ferrule_web_macros::BindingMetadata;
use http::{HeaderName, HeaderValue, Method};

#[allow(dead_code)]
struct Order {
    sku: String,
    quantity: u32,
}

#[allow(dead_code)]
struct OrderRepository;

#[allow(dead_code)]
struct TenantBinder;

#[allow(dead_code)]
#[derive(BindingMetadata)]
struct TraceRequest {
    #[from_header(name = "X-Trace")]
    trace_id: String,
}

#[allow(dead_code)]
#[derive(BindingMetadata)]
#[binding(handler = "OrdersController::update")]
struct UpdateOrder {
    id: u64,

    #[from_query(name = "dry-run")]
    #[bind_required]
    dry_run: bool,

    page: Option<u32>,

    #[from_body(empty_body = "disallow")]
    order: Order,

    #[from_services]
    repository: OrderRepository,

    #[from_sources(query, route)]
    tenant: String,

    #[model_binder(binder = TenantBinder, name = "region")]
    r#region: String,

    cancellation: CancellationToken,
}

#[allow(dead_code)]
#[derive(BindingMetadata)]
struct TwoBodies {
    order: Order,
    lines: Vec<Order>,
}

#[allow(dead_code)]
#[derive(BindingMetadata)]
struct Ambiguous {
    #[from_query]
    #[from_route]
    id: u64,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("ferrule_web=debug")
        .with_test_writer()
        .try_init();
}

#[test]
fn test_header_with_name_override() {
    init_tracing();
    let bindings = describe::<TraceRequest>(&[]).unwrap();
    let binding = bindings.get("trace_id").unwrap();

    assert_eq!(binding.binding_source(), &BindingSource::HEADER);
    assert_eq!(binding.binding_name(), "X-Trace");
    assert!(!binding.is_inferred());

    let request = RequestData::new(Method::GET, "/trace").with_header(
        HeaderName::from_static("x-trace"),
        HeaderValue::from_static("abc"),
    );
    assert_eq!(select_value(binding, &request), Some("abc"));
}

#[test]
fn test_full_handler_description() {
    init_tracing();
    let bindings = describe::<UpdateOrder>(&["/orders/{id:int}"]).unwrap();
    assert_eq!(bindings.handler(), "OrdersController::update");
    assert_eq!(bindings.len(), 8);

    let source = |name: &str| bindings.get(name).unwrap().binding_source().clone();
    assert_eq!(source("id"), BindingSource::PATH);
    assert_eq!(source("dry_run"), BindingSource::QUERY);
    assert_eq!(source("page"), BindingSource::QUERY);
    assert_eq!(source("order"), BindingSource::BODY);
    assert_eq!(source("repository"), BindingSource::SERVICES);
    assert_eq!(source("region"), BindingSource::CUSTOM);
    assert_eq!(source("cancellation"), BindingSource::SPECIAL);
    assert_eq!(source("tenant").id(), "Path&Query");

    let dry_run = bindings.get("dry_run").unwrap();
    assert_eq!(dry_run.binding_name(), "dry-run");
    assert!(dry_run.is_required());

    let order = bindings.body_parameter().unwrap();
    assert_eq!(order.member_name(), "order");
    assert_eq!(order.info().empty_body_behavior(), EmptyBodyBehavior::Disallow);

    let region = bindings.get("region").unwrap();
    assert_eq!(region.binding_name(), "region");
    assert_eq!(
        region.info().binder_type(),
        Some(&TypeDescriptor::of::<TenantBinder>())
    );
}

#[test]
fn test_values_are_read_from_the_request() {
    let bindings = describe::<UpdateOrder>(&["/orders/{id}"]).unwrap();
    let request = RequestData::new(Method::PUT, "/orders/42")
        .with_route_value("id", "42")
        .with_query("dry-run", "true")
        .with_query("tenant", "acme");

    let value = |name: &str| select_value(bindings.get(name).unwrap(), &request);
    assert_eq!(value("id"), Some("42"));
    assert_eq!(value("dry_run"), Some("true"));
    assert_eq!(value("tenant"), Some("acme"));
    assert_eq!(value("page"), None);
    assert_eq!(value("order"), None);
}

#[test]
fn test_suppressed_inference() {
    let options = MvcOptions {
        suppress_inferred_binding_sources: true,
        ..MvcOptions::default()
    };
    let bindings = describe_with::<TwoBodies>(&[], &options).unwrap();
    assert!(bindings
        .iter()
        .all(|p| p.binding_source() == &BindingSource::MODEL_BINDING));
}

#[test]
fn test_registration_errors() {
    let err = describe::<TwoBodies>(&[]).unwrap_err();
    assert_eq!(
        err,
        ConfigurationError::MultipleBodyParameters {
            handler: "TwoBodies".to_string(),
            members: vec!["order".to_string(), "lines".to_string()],
        }
    );

    let err = describe::<Ambiguous>(&[]).unwrap_err();
    assert!(matches!(
        err,
        ConfigurationError::AmbiguousBindingSource { ref member, .. } if member == "id"
    ));
}
