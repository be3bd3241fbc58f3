//! Integration tests for the container's public API and the derive macro.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

use provision::{
    Constructor, ConstructorDescriptor, Container, Injectable, Instance, Module, ResolveError,
    TypeDescriptor,
};

#[derive(Debug, Injectable)]
struct Leaf;

#[derive(Debug, Injectable)]
struct Node {
    leaf: Arc<Leaf>,
}

#[derive(Debug, Injectable)]
struct Pair(Arc<Leaf>, Arc<Node>);

#[derive(Debug, Injectable)]
struct Tally {
    node: Arc<Node>,
    #[inject(default)]
    hits: AtomicUsize,
    #[inject(default)]
    label: String,
}

#[derive(Debug, Injectable)]
struct Empty {}

#[derive(Debug, Injectable)]
struct Orphan {
    _missing: Arc<Unlisted>,
}

#[derive(Debug)]
struct Unlisted;

#[derive(Debug, Injectable)]
struct First {
    _second: Arc<Second>,
}

#[derive(Debug, Injectable)]
struct Second {
    _third: Arc<Third>,
}

#[derive(Debug, Injectable)]
struct Third {
    _first: Arc<First>,
}

#[derive(Debug, Injectable)]
struct Holder<T> {
    value: Arc<T>,
}

mod resolution {
    use super::*;

    #[test]
    fn test_leaf_and_node_share_the_leaf() {
        let container = Container::new();
        container.register::<Leaf>();
        container.register::<Node>();

        let node = container.get::<Node>().unwrap();
        let leaf = container.get::<Leaf>().unwrap();
        assert!(Arc::ptr_eq(&node.leaf, &leaf));
    }

    #[test]
    fn test_registration_order_does_not_matter() {
        let container = Container::new();
        container.register::<Node>();
        container.register::<Leaf>();

        assert!(container.get::<Node>().is_ok());
    }

    #[test]
    fn test_register_twice_behaves_like_once() {
        let once = Container::new();
        once.register::<Leaf>();

        let twice = Container::new();
        twice.register::<Leaf>();
        twice.register::<Leaf>();

        assert_eq!(once.registered(), twice.registered());
        assert!(twice.get::<Leaf>().is_ok());
    }

    #[test]
    fn test_unregistered_type_always_fails() {
        let container = Container::new();
        container.register::<Node>();

        for _ in 0..3 {
            assert_eq!(
                container.get::<Leaf>().unwrap_err(),
                ResolveError::Unregistered {
                    ty: TypeDescriptor::of::<Leaf>()
                }
            );
        }
    }

    #[test]
    fn test_unregistered_parameter_means_no_usable_constructor() {
        let container = Container::new();
        container.register::<Orphan>();

        assert_eq!(
            container.get::<Orphan>().unwrap_err(),
            ResolveError::NoUsableConstructor {
                ty: TypeDescriptor::of::<Orphan>(),
                constructors: 1,
            }
        );
    }

    #[test]
    fn test_tuple_struct_fields_are_wired_in_order() {
        let container = Container::new();
        container.register::<Leaf>();
        container.register::<Node>();
        container.register::<Pair>();

        let pair = container.get::<Pair>().unwrap();
        assert!(Arc::ptr_eq(&pair.0, &pair.1.leaf));
    }

    #[test]
    fn test_default_fields_are_not_parameters() {
        assert_eq!(
            Tally::constructors()[0].parameters(),
            &[TypeDescriptor::of::<Node>()]
        );

        let container = Container::new();
        container.register::<Leaf>();
        container.register::<Node>();
        container.register::<Tally>();

        let tally = container.get::<Tally>().unwrap();
        tally.hits.fetch_add(1, Ordering::SeqCst);
        assert_eq!(container.get::<Tally>().unwrap().hits.load(Ordering::SeqCst), 1);
        assert!(tally.label.is_empty());
        assert!(Arc::ptr_eq(&tally.node, &container.get::<Node>().unwrap()));
    }

    #[test]
    fn test_struct_without_fields() {
        assert!(Empty::constructors()[0].parameters().is_empty());

        let container = Container::new();
        container.register::<Empty>();
        assert!(container.get::<Empty>().is_ok());
    }

    #[test]
    fn test_generic_struct_derives_injectable() {
        let container = Container::new();
        container.register::<Leaf>();
        container.register::<Holder<Leaf>>();

        let holder = container.get::<Holder<Leaf>>().unwrap();
        assert!(Arc::ptr_eq(&holder.value, &container.get::<Leaf>().unwrap()));
        assert!(!container.contains::<Holder<Node>>());
    }

    #[test]
    fn test_three_type_cycle_reports_path() {
        let container = Container::new();
        container.register::<First>();
        container.register::<Second>();
        container.register::<Third>();

        let err = container.get::<Second>().unwrap_err();
        assert_eq!(err.to_string(), "Cyclic dependency: Second -> Third -> First -> Second");
        assert!(!container.is_resolved(&TypeDescriptor::of::<Second>()));
    }

    #[test]
    fn test_containers_are_independent() {
        let left = Container::new();
        let right = Container::new();
        left.register::<Leaf>();
        right.register::<Leaf>();

        let a = left.get::<Leaf>().unwrap();
        let b = right.get::<Leaf>().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(!Container::new().contains::<Leaf>());
    }
}

mod selection {
    use super::*;

    #[derive(Debug)]
    struct Primary;
    #[derive(Debug)]
    struct Optional;

    #[derive(Debug)]
    struct Service {
        optional: Option<Arc<Optional>>,
    }

    impl Injectable for Service {
        fn constructors() -> Vec<Constructor<Self>> {
            vec![
                Constructor::new(|_: Arc<Primary>, optional: Arc<Optional>| Service {
                    optional: Some(optional),
                }),
                Constructor::new(|_: Arc<Primary>| Service { optional: None }),
            ]
        }
    }

    fn container_with_primary() -> Container {
        let container = Container::new();
        container.register_with(vec![Constructor::new(|| Primary)]);
        container.register::<Service>();
        container
    }

    #[test]
    fn test_falls_back_to_later_constructor() {
        let container = container_with_primary();
        assert!(container.get::<Service>().unwrap().optional.is_none());
    }

    #[test]
    fn test_prefers_first_usable_constructor() {
        let container = container_with_primary();
        container.register_with(vec![Constructor::new(|| Optional)]);

        let service = container.get::<Service>().unwrap();
        assert!(Arc::ptr_eq(
            service.optional.as_ref().unwrap(),
            &container.get::<Optional>().unwrap()
        ));
    }

    #[test]
    fn test_cached_instance_survives_later_registrations() {
        let container = container_with_primary();
        let before = container.get::<Service>().unwrap();

        container.register_with(vec![Constructor::new(|| Optional)]);
        let after = container.get::<Service>().unwrap();

        assert!(Arc::ptr_eq(&before, &after));
        assert!(after.optional.is_none());
    }
}

mod runtime_descriptors {
    use super::*;

    #[test]
    fn test_get_instance_with_descriptor() {
        let container = Container::new();
        let ty = TypeDescriptor::of::<u64>();
        container.register_descriptor(
            ty,
            vec![ConstructorDescriptor::from_parts(ty, Vec::new(), |_| {
                Ok(Arc::new(42u64) as Instance)
            })],
        );

        let instance = container.get_instance(&ty).unwrap();
        assert_eq!(*instance.downcast::<u64>().unwrap(), 42);
        assert!(container.contains_descriptor(&ty));
    }

    #[test]
    fn test_descriptor_factory_reads_arguments() {
        let container = Container::new();
        container.register::<Leaf>();

        let ty = TypeDescriptor::of::<String>();
        container.register_descriptor(
            ty,
            vec![ConstructorDescriptor::from_parts(
                ty,
                vec![TypeDescriptor::of::<Leaf>()],
                |mut args| {
                    let _leaf = args.next::<Leaf>()?;
                    Ok(Arc::new(format!("{} left", args.remaining())) as Instance)
                },
            )],
        );

        assert_eq!(container.get::<String>().unwrap().as_str(), "0 left");
    }

    #[test]
    fn test_factory_producing_another_type_is_not_cached() {
        let container = Container::new();
        let ty = TypeDescriptor::of::<u64>();
        container.register_descriptor(
            ty,
            vec![ConstructorDescriptor::from_parts(ty, Vec::new(), |_| {
                Ok(Arc::new(String::from("not a number")) as Instance)
            })],
        );

        for _ in 0..2 {
            assert_eq!(
                container.get_instance(&ty).unwrap_err(),
                ResolveError::TypeMismatch { expected: ty }
            );
        }
        assert!(!container.is_resolved(&ty));
        assert!(container.try_get::<u64>().is_none());
    }
}

mod modules {
    use super::*;

    struct Tree;

    impl Module for Tree {
        fn register(&self, container: &Container) {
            container.register::<Leaf>();
            container.register::<Node>();
        }
    }

    #[test]
    fn test_install_registers_everything() {
        let container = Container::new();
        container.install(&Tree);

        assert!(container.contains::<Leaf>());
        assert!(container.contains::<Node>());
        assert!(container.get::<Node>().is_ok());
    }

    #[test]
    fn test_install_as_trait_object() {
        let modules: Vec<Box<dyn Module>> = vec![Box::new(Tree), Box::new(Tree)];
        let container = Container::new();
        for module in &modules {
            container.install(module.as_ref());
        }

        assert_eq!(container.registered().len(), 2);
    }
}

mod concurrency {
    use super::*;

    static SLOW_BUILDS: AtomicUsize = AtomicUsize::new(0);

    #[derive(Debug)]
    struct Slow;

    #[test]
    fn test_concurrent_first_resolution_constructs_once() {
        let container = Arc::new(Container::new());
        container.register_with(vec![Constructor::new(|| {
            SLOW_BUILDS.fetch_add(1, Ordering::SeqCst);
            thread::sleep(std::time::Duration::from_millis(20));
            Slow
        })]);

        let threads = 8;
        let barrier = Arc::new(Barrier::new(threads));
        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let container = Arc::clone(&container);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    container.get::<Slow>().unwrap()
                })
            })
            .collect();

        let instances: Vec<Arc<Slow>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(SLOW_BUILDS.load(Ordering::SeqCst), 1);
        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_container_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Container>();
    }
}
