use std::sync::Arc;

use vessel_di::{BindingCollection, DiError, Resolver};

#[test]
fn concrete_singletons_are_shared() {
    let mut bindings = BindingCollection::new();
    bindings.add_singleton(42usize).unwrap();
    bindings.add_singleton("hello".to_string()).unwrap();

    let container = bindings.build().unwrap();

    let num1 = container.get::<usize>().unwrap();
    let num2 = container.get::<usize>().unwrap();
    let str1 = container.get::<String>().unwrap();
    let str2 = container.get::<String>().unwrap();

    assert_eq!(*num1, 42);
    assert_eq!(*str1, "hello");
    assert!(Arc::ptr_eq(&num1, &num2));
    assert!(Arc::ptr_eq(&str1, &str2));
}

#[test]
fn factory_resolves_dependencies() {
    #[derive(Debug)]
    struct Config {
        port: u16,
    }

    #[derive(Debug)]
    struct Server {
        config: Arc<Config>,
        name: String,
    }

    let mut bindings = BindingCollection::new();
    bindings.add_singleton(Config { port: 8080 }).unwrap();
    bindings
        .add_singleton_factory::<Server, _>(|ctx| {
            Ok(Server {
                config: ctx.get::<Config>()?,
                name: "MyServer".to_string(),
            })
        })
        .unwrap();

    let container = bindings.build().unwrap();
    let server = container.get::<Server>().unwrap();

    assert_eq!(server.config.port, 8080);
    assert_eq!(server.name, "MyServer");
}

#[test]
fn prototypes_create_new_instances() {
    let counter = Arc::new(parking_lot::Mutex::new(0));
    let counter_in_factory = counter.clone();

    let mut bindings = BindingCollection::new();
    bindings
        .add_prototype_factory::<String, _>(move |_| {
            let mut c = counter_in_factory.lock();
            *c += 1;
            Ok(format!("instance-{}", *c))
        })
        .unwrap();

    let container = bindings.build().unwrap();

    let a = container.get::<String>().unwrap();
    let b = container.get::<String>().unwrap();
    let c = container.get::<String>().unwrap();

    assert_eq!(*a, "instance-1");
    assert_eq!(*b, "instance-2");
    assert_eq!(*c, "instance-3");
    assert!(!Arc::ptr_eq(&a, &b));
    assert!(!Arc::ptr_eq(&b, &c));

    // The container holds no reference: the caller is the sole owner.
    assert_eq!(Arc::strong_count(&a), 1);
}

#[test]
fn unregistered_type_is_not_found() {
    struct Unregistered;

    let container = BindingCollection::new().build().unwrap();

    match container.get::<Unregistered>() {
        Err(DiError::NotFound { type_name, qualifier }) => {
            assert!(type_name.contains("Unregistered"));
            assert_eq!(qualifier, None);
        }
        _ => panic!("expected NotFound"),
    }
}

#[test]
fn duplicate_default_fails_at_registration() {
    let mut bindings = BindingCollection::new();
    bindings.add_singleton(1usize).unwrap();

    let err = bindings.add_singleton(2usize).unwrap_err();
    assert!(matches!(
        err,
        DiError::DuplicateBinding { qualifier: None, .. }
    ));

    // The original registration stays intact.
    let container = bindings.build().unwrap();
    assert_eq!(*container.get::<usize>().unwrap(), 1);
}

#[test]
fn duplicate_qualifier_fails_at_registration() {
    struct Repo;

    let mut bindings = BindingCollection::new();
    bindings
        .add_qualified_singleton_factory::<Repo, _>("primary", |_| Ok(Repo))
        .unwrap();

    let err = bindings
        .add_qualified_singleton_factory::<Repo, _>("primary", |_| Ok(Repo))
        .unwrap_err();
    assert!(matches!(
        err,
        DiError::DuplicateBinding {
            qualifier: Some("primary"),
            ..
        }
    ));
}

#[test]
fn try_add_skips_existing_default() {
    let mut bindings = BindingCollection::new();

    assert!(bindings.try_add_singleton(10usize));
    assert!(!bindings.try_add_singleton(99usize));

    let container = bindings.build().unwrap();
    assert_eq!(*container.get::<usize>().unwrap(), 10);
}

#[test]
fn complex_dependency_graph_shares_singletons() {
    struct A {
        value: i32,
    }

    struct B {
        a: Arc<A>,
    }

    struct C {
        a: Arc<A>,
        b: Arc<B>,
    }

    let mut bindings = BindingCollection::new();
    bindings.add_singleton(A { value: 100 }).unwrap();
    bindings
        .add_singleton_factory::<B, _>(|ctx| Ok(B { a: ctx.get::<A>()? }))
        .unwrap();
    bindings
        .add_singleton_factory::<C, _>(|ctx| {
            Ok(C {
                a: ctx.get::<A>()?,
                b: ctx.get::<B>()?,
            })
        })
        .unwrap();

    let container = bindings.build().unwrap();
    let c = container.get::<C>().unwrap();

    assert_eq!(c.a.value, 100);
    assert_eq!(c.b.a.value, 100);
    assert!(Arc::ptr_eq(&c.a, &c.b.a));
}

#[test]
fn factory_errors_propagate_and_leave_container_usable() {
    struct Flaky;

    let mut bindings = BindingCollection::new();
    bindings.add_singleton(5u8).unwrap();
    bindings
        .add_prototype_factory::<Flaky, _>(|ctx| {
            // Depends on something never registered.
            let _missing = ctx.get::<String>()?;
            Ok(Flaky)
        })
        .unwrap();

    let container = bindings.build().unwrap();

    assert!(matches!(
        container.get::<Flaky>(),
        Err(DiError::NotFound { .. })
    ));
    // The failed resolution does not poison anything else.
    assert_eq!(*container.get::<u8>().unwrap(), 5);
}

#[test]
fn descriptors_list_every_binding() {
    use vessel_di::Scope;

    struct Widget;

    let mut bindings = BindingCollection::new();
    bindings.add_singleton(1u32).unwrap();
    bindings
        .add_qualified_unit_of_work_factory::<Widget, _>("w", |_| Ok(Widget))
        .unwrap();

    let descriptors = bindings.descriptors();
    assert_eq!(descriptors.len(), 2);

    let widget = descriptors
        .iter()
        .find(|d| d.qualifier == Some("w"))
        .unwrap();
    assert_eq!(widget.scope, Scope::UnitOfWork);
    assert!(widget.type_name().contains("Widget"));
    assert!(widget.is_qualified());
    assert!(!widget.primary);
}
