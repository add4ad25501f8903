// Property-based tests for the resume/yield protocol.
//
// Every coroutine counts its own iterations in a stack local. Whatever order the caller
// resumes them in, each one must end with exactly its own count.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use costack::{CoroutineId, Scheduler, State};
use proptest::prelude::*;

fn counting(iterations: usize, finished: Rc<Cell<Option<usize>>>, log: Rc<RefCell<Vec<CoroutineId>>>) -> impl FnOnce(&Scheduler) {
    move |s: &Scheduler| {
        let me = s.running_id().unwrap();
        let mut done = 0;
        while done < iterations {
            done += 1;
            log.borrow_mut().push(me);
            s.yield_now();
        }
        finished.set(Some(done));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn each_coroutine_completes_its_own_iterations(
        iterations in prop::collection::vec(0usize..20, 1..6),
        order in prop::collection::vec(any::<prop::sample::Index>(), 1..32)
    ) {
        let scheduler = Scheduler::new().unwrap();
        let log = Rc::new(RefCell::new(Vec::new()));
        let finished: Vec<Rc<Cell<Option<usize>>>> = iterations.iter().map(|_| Rc::new(Cell::new(None))).collect();

        let ids: Vec<CoroutineId> = iterations
            .iter()
            .zip(&finished)
            .map(|(n, done)| scheduler.create(counting(*n, done.clone(), log.clone())))
            .collect();

        let mut step = 0;
        while ids.iter().any(|id| scheduler.status(*id) != State::Dead) {
            let id = ids[order[step % order.len()].index(ids.len())];
            step += 1;
            scheduler.resume(id);
            prop_assert_eq!(scheduler.running_id(), None);
            // guarantees progress when `order` never picks some coroutine
            if step % order.len() == 0 {
                for id in &ids {
                    scheduler.resume(*id);
                }
            }
        }

        for (n, done) in iterations.iter().zip(&finished) {
            prop_assert_eq!(done.get(), Some(*n));
        }
        for (n, id) in iterations.iter().zip(&ids) {
            let yields = log.borrow().iter().filter(|logged| *logged == id).count();
            prop_assert_eq!(yields, *n);
        }
        prop_assert!(scheduler.is_empty());
    }

    #[test]
    fn ids_are_strictly_increasing(creates in 1usize..50, finish_every in 1usize..5) {
        let scheduler = Scheduler::new().unwrap();
        let mut ids = Vec::with_capacity(creates);
        for i in 0..creates {
            let id = scheduler.create(|s| s.yield_now());
            if i % finish_every == 0 {
                scheduler.resume(id);
                scheduler.resume(id);
                prop_assert_eq!(scheduler.status(id), State::Dead);
            }
            ids.push(id);
        }

        prop_assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
    }
}
