//! Readers never observe a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use fulltext::{CancellationToken, Doc, IndexService};

#[test]
fn test_updates_are_atomic_for_readers() {
    let svc = IndexService::new();
    svc.upsert(&[Doc::new(1, "shared alpha"), Doc::new(2, "bystander")])
        .unwrap();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        let writer = s.spawn(|| {
            let mut current = "shared alpha".to_string();
            for i in 0..200 {
                let next = if i % 2 == 0 {
                    "shared omega"
                } else {
                    "shared alpha"
                };
                svc.upsert(&[Doc::update(1, next, current.as_str())]).unwrap();
                current = next.to_string();
            }
            done.store(true, Ordering::Release);
        });

        let readers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let token = CancellationToken::new();
                    let mut searches = 0u32;
                    while !done.load(Ordering::Acquire) || searches < 10 {
                        // Exactly one version of doc 1 is visible at a time.
                        assert_eq!(svc.search(&token, "shared").unwrap(), vec![1]);
                        let alpha = svc.search(&token, "alpha").unwrap();
                        let omega = svc.search(&token, "omega").unwrap();
                        assert!(alpha.len() <= 1 && omega.len() <= 1);
                        searches += 1;
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    });

    assert_eq!(svc.document_count(), 2);
    let token = CancellationToken::new();
    assert_eq!(svc.search(&token, "alpha").unwrap(), vec![1]);
    assert!(svc.search(&token, "omega").unwrap().is_empty());
}

#[test]
fn test_service_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<IndexService>();
}
