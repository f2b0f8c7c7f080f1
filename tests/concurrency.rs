//! Concurrent resolution: singleton creation races, prototype independence,
//! and unit-of-work partitioning across threads.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};

use crossbeam_utils::thread;
use vessel_di::{BindingCollection, Resolver};

const THREADS: usize = 8;

#[test]
fn singleton_factory_runs_exactly_once_under_contention() {
    struct Expensive {
        serial: u32,
    }

    let factory_runs = Arc::new(AtomicU32::new(0));
    let runs_in_factory = factory_runs.clone();

    let mut bindings = BindingCollection::new();
    bindings
        .add_singleton_factory::<Expensive, _>(move |_| {
            let serial = runs_in_factory.fetch_add(1, Ordering::SeqCst);
            // Widen the race window so every thread reaches the slot.
            std::thread::sleep(std::time::Duration::from_millis(10));
            Ok(Expensive { serial })
        })
        .unwrap();

    let container = bindings.build().unwrap();
    let barrier = Barrier::new(THREADS);

    let resolved: Vec<Arc<Expensive>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let container = container.clone();
                let barrier = &barrier;
                scope.spawn(move |_| {
                    barrier.wait();
                    container.get::<Expensive>().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(factory_runs.load(Ordering::SeqCst), 1);
    for instance in &resolved {
        assert!(Arc::ptr_eq(instance, &resolved[0]));
        assert_eq!(instance.serial, 0);
    }
}

#[test]
fn prototypes_never_share_under_contention() {
    struct Scratch {
        serial: u32,
    }

    let factory_runs = Arc::new(AtomicU32::new(0));
    let runs_in_factory = factory_runs.clone();

    let mut bindings = BindingCollection::new();
    bindings
        .add_prototype_factory::<Scratch, _>(move |_| {
            Ok(Scratch {
                serial: runs_in_factory.fetch_add(1, Ordering::SeqCst),
            })
        })
        .unwrap();

    let container = bindings.build().unwrap();

    let serials: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let container = container.clone();
                scope.spawn(move |_| container.get::<Scratch>().unwrap().serial)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    assert_eq!(factory_runs.load(Ordering::SeqCst), THREADS as u32);
    let mut sorted = serials.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), THREADS);
}

#[test]
fn units_of_work_are_partitioned_per_thread() {
    struct WorkState {
        serial: u32,
    }

    let factory_runs = Arc::new(AtomicU32::new(0));
    let runs_in_factory = factory_runs.clone();

    let mut bindings = BindingCollection::new();
    bindings
        .add_unit_of_work_factory::<WorkState, _>(move |_| {
            Ok(WorkState {
                serial: runs_in_factory.fetch_add(1, Ordering::SeqCst),
            })
        })
        .unwrap();

    let container = bindings.build().unwrap();
    let barrier = Barrier::new(THREADS);

    let serials: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let container = container.clone();
                let barrier = &barrier;
                scope.spawn(move |_| {
                    barrier.wait();
                    let work = container.begin_unit_of_work().unwrap();
                    let a = work.get::<WorkState>().unwrap();
                    let b = work.get::<WorkState>().unwrap();
                    assert!(Arc::ptr_eq(&a, &b));
                    let serial = a.serial;
                    work.complete().unwrap();
                    serial
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
    .unwrap();

    // One instance per unit of work, all distinct.
    assert_eq!(factory_runs.load(Ordering::SeqCst), THREADS as u32);
    let mut sorted = serials;
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), THREADS);
}

#[test]
fn concurrent_singleton_dependents_share_the_dependency() {
    struct Base;
    struct DependentA {
        base: Arc<Base>,
    }
    struct DependentB {
        base: Arc<Base>,
    }

    let mut bindings = BindingCollection::new();
    bindings.add_singleton_factory::<Base, _>(|_| Ok(Base)).unwrap();
    bindings
        .add_singleton_factory::<DependentA, _>(|ctx| {
            Ok(DependentA {
                base: ctx.get::<Base>()?,
            })
        })
        .unwrap();
    bindings
        .add_singleton_factory::<DependentB, _>(|ctx| {
            Ok(DependentB {
                base: ctx.get::<Base>()?,
            })
        })
        .unwrap();

    let container = bindings.build().unwrap();

    let (a, b) = thread::scope(|scope| {
        let ca = container.clone();
        let cb = container.clone();
        let ha = scope.spawn(move |_| ca.get::<DependentA>().unwrap());
        let hb = scope.spawn(move |_| cb.get::<DependentB>().unwrap());
        (ha.join().unwrap(), hb.join().unwrap())
    })
    .unwrap();

    assert!(Arc::ptr_eq(&a.base, &b.base));
}
