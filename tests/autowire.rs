use std::sync::{
    atomic::{AtomicU8, Ordering},
    Arc,
};

use bindwire::{AutoWired, ConstructorArgs, Container, InstantiateErrorKind, ResolveErrorKind, TypeRegistration, TypeRegistryBuilder};
use tracing_test::traced_test;

struct Conn;

#[derive(Default)]
struct Service {
    conn: Option<Arc<Conn>>,
    ready: bool,
}

fn service_registry(constructor_call_count: &Arc<AtomicU8>) -> TypeRegistryBuilder {
    TypeRegistryBuilder::new().register_autowired(
        TypeRegistration::<Service>::new()
            .constructor({
                let constructor_call_count = constructor_call_count.clone();
                move |_: &ConstructorArgs| {
                    constructor_call_count.fetch_add(1, Ordering::SeqCst);
                    Ok(Service::default())
                }
            })
            .inject_type::<Conn>("conn", |service, conn| service.conn = Some(conn))
            .initializer(|service| service.ready = true),
    )
}

#[test]
#[traced_test]
fn test_construct_resolves_exactly_once() {
    let constructor_call_count = Arc::new(AtomicU8::new(0));
    let conn_factory_call_count = Arc::new(AtomicU8::new(0));

    let container = Container::new(service_registry(&constructor_call_count));
    container.bind::<Conn>().factory({
        let conn_factory_call_count = conn_factory_call_count.clone();
        move |_| {
            conn_factory_call_count.fetch_add(1, Ordering::SeqCst);
            Ok::<_, InstantiateErrorKind>(Conn)
        }
    });

    let service = AutoWired::<Service>::construct(&container).unwrap();

    assert!(service.conn.is_some());
    assert!(service.ready);
    assert_eq!(constructor_call_count.load(Ordering::SeqCst), 1);
    assert_eq!(conn_factory_call_count.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_construct_requires_autowired_registration() {
    let container = Container::new(TypeRegistryBuilder::new());

    assert!(matches!(
        AutoWired::<Service>::construct(&container),
        Err(ResolveErrorKind::NotRegistered { type_name: "AutoWired" })
    ));
}

#[test]
#[traced_test]
fn test_clone_shares_the_instance() {
    let constructor_call_count = Arc::new(AtomicU8::new(0));

    let container = Container::new(service_registry(&constructor_call_count));
    container.bind::<Conn>().factory(|_| Ok::<_, InstantiateErrorKind>(Conn));

    let service = AutoWired::<Service>::construct(&container).unwrap();
    let clone = service.clone();

    assert!(Arc::ptr_eq(&service.into_inner(), &clone.into_inner()));
    assert_eq!(constructor_call_count.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_wrapper_id_requires_typed_construct() {
    let constructor_call_count = Arc::new(AtomicU8::new(0));

    let container = Container::new(service_registry(&constructor_call_count));
    container.bind::<Conn>().factory(|_| Ok::<_, InstantiateErrorKind>(Conn));

    // The marker unwraps to Service before construction, so the typed entry
    // point for the wrapper id cannot hand the result back as a wrapper.
    let err = container
        .create_instance::<AutoWired<Service>>(ConstructorArgs::new())
        .unwrap_err();
    assert!(matches!(err, ResolveErrorKind::IncorrectType { .. }));
    assert_eq!(constructor_call_count.load(Ordering::SeqCst), 1);
}

#[test]
#[traced_test]
fn test_registration_also_serves_plain_construction() {
    let constructor_call_count = Arc::new(AtomicU8::new(0));

    let container = Container::new(service_registry(&constructor_call_count));
    container.bind::<Conn>().factory(|_| Ok::<_, InstantiateErrorKind>(Conn));

    let service = container.create_instance::<Service>(ConstructorArgs::new()).unwrap();

    assert!(service.conn.is_some());
    assert!(service.ready);
    assert_eq!(constructor_call_count.load(Ordering::SeqCst), 1);
}
