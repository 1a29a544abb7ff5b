//! A simple tally example.
//!
//! In this example, there are two groups of threads:
//! -   Producer threads record each word they produce in a Vector, then push it onto a Queue.
//! -   Consumer threads pop words from the Queue, and count their letters in a Combinable.
//!
//! Once all threads are done, the main thread combines the counts.
//!
//! The total number of letters counted by the consumers matches the total number of letters of the words recorded.

extern crate crossbeam_utils;
extern crate segmented;

use std::sync::atomic::{AtomicUsize, Ordering};

use segmented::combinable::Combinable;
use segmented::queue::Queue;
use segmented::vector::Vector;

fn main() {
    const NUMBER_PRODUCERS: usize = 4;
    const NUMBER_CONSUMERS: usize = 4;
    const WORDS_PER_PRODUCER: usize = 1_000;

    let queue: Queue<String> = Queue::new();
    let recorded: Vector<String> = Vector::new();
    let mut letters: Combinable<usize> = Combinable::new();
    let done = AtomicUsize::new(0);

    crossbeam_utils::thread::scope(|scope| {
        //  Producers
        for p in 0..NUMBER_PRODUCERS {
            let (queue, recorded, done) = (&queue, &recorded, &done);

            scope.spawn(move |_| {
                for i in 0..WORDS_PER_PRODUCER {
                    let word = format!("word-{}-{}", p, i);
                    recorded.push(word.clone());
                    queue.push(word);
                }

                done.fetch_add(1, Ordering::Release);
            });
        }

        //  Consumers
        for _ in 0..NUMBER_CONSUMERS {
            let (queue, letters, done) = (&queue, &letters, &done);

            scope.spawn(move |_| {
                loop {
                    //  Read before popping, so that an empty queue after all producers are done is truly empty.
                    let finished = done.load(Ordering::Acquire) == NUMBER_PRODUCERS;

                    match queue.try_pop() {
                        Some(word) => *letters.local() += word.len(),
                        None if finished => break,
                        None => std::thread::yield_now(),
                    }
                }
            });
        }
    }).unwrap();

    let expected: usize = recorded.iter().map(|word| word.len()).sum();
    let threads = letters.len();
    let counted = letters.combine(|a, b| a + b);

    println!("Recorded {} words in {} segments.", recorded.len(), recorded.number_segments());
    println!("Counted {} letters across {} consumer threads.", counted, threads);

    assert_eq!(NUMBER_PRODUCERS * WORDS_PER_PRODUCER, recorded.len());
    assert_eq!(expected, counted);
    assert!(queue.is_empty());
}
