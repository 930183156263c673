use std::{
  cell::{Cell, RefCell},
  convert::Infallible,
  rc::Rc,
};

use rxscreens::prelude::*;

fn ms(n: u64) -> Duration { Duration::from_millis(n) }

#[derive(Debug, PartialEq)]
enum Event<T, E> {
  Next(T),
  Complete,
  Error(E),
}

type Log<T, E> = Rc<RefCell<Vec<Event<T, E>>>>;

fn recorder<T, E>(log: &Log<T, E>) -> Sink<impl FnMut(T), impl FnOnce(Option<E>)> {
  let (l1, l2) = (log.clone(), log.clone());
  Sink::new(
    move |v: T| l1.borrow_mut().push(Event::Next(v)),
    move |reason: Option<E>| {
      l2.borrow_mut().push(match reason {
        None => Event::Complete,
        Some(e) => Event::Error(e),
      })
    },
  )
}

fn bridge_recorder(log: &Log<&'static str, String>) -> Sink<impl FnMut(&'static str), impl FnOnce(Option<FetchError>)> {
  let (l1, l2) = (log.clone(), log.clone());
  Sink::new(
    move |v: &'static str| l1.borrow_mut().push(Event::Next(v)),
    move |reason: Option<FetchError>| {
      l2.borrow_mut().push(reason.map_or(Event::Complete, |e| Event::Error(e.to_string())))
    },
  )
}

#[test]
fn debounce_emits_last_value_one_quiet_period_after_it() {
  TestScheduler::init();
  let d = ms(500);
  let relay = Relay::<&str>::new();
  let seen = Rc::new(RefCell::new(vec![]));
  let s = seen.clone();
  relay.clone().debounce(d, TestScheduler).subscribe(move |v| s.borrow_mut().push((TestScheduler::now(), v)));

  relay.push("a");
  TestScheduler::advance_by(ms(50));
  relay.push("b");
  TestScheduler::advance_by(ms(50));
  relay.push("c");
  TestScheduler::advance_by(ms(2_000));

  assert_eq!(*seen.borrow(), vec![(ms(100) + d, "c")]);
}

#[test]
fn bridge_drops_response_of_superseded_request() {
  TestScheduler::init();
  let bridge = AsyncBridge::new(
    |(name, latency): (&'static str, u64)| async move {
      TestScheduler.sleep(ms(latency)).await;
      Ok::<_, FetchError>(name)
    },
    TestScheduler,
  );
  let log = Log::default();

  bridge.request(("A", 200)).actual_subscribe(bridge_recorder(&log));
  TestScheduler::advance_by(ms(50));
  bridge.request(("B", 100)).actual_subscribe(bridge_recorder(&log));

  TestScheduler::advance_by(ms(100));
  assert_eq!(*log.borrow(), vec![Event::Next("B"), Event::Complete]);
  assert_eq!(TestScheduler::now(), ms(150));

  TestScheduler::advance_by(ms(500));
  assert_eq!(*log.borrow(), vec![Event::Next("B"), Event::Complete]);
}

#[test]
fn filter_keeps_order_of_accepted_values() {
  let relay = Relay::<i32>::new();
  let log = Log::<i32, Infallible>::default();
  relay.clone().filter(|v| v % 3 != 0).actual_subscribe(recorder(&log));

  for v in [5, 3, 1, 9, 4, 2] {
    relay.push(v);
  }
  relay.complete();

  assert_eq!(
    *log.borrow(),
    vec![Event::Next(5), Event::Next(1), Event::Next(4), Event::Next(2), Event::Complete]
  );
}

#[derive(Debug, PartialEq)]
struct Rejected(i32);

impl From<Infallible> for Rejected {
  fn from(e: Infallible) -> Self { match e {} }
}

#[test]
fn partial_map_failure_is_terminal_and_releases_upstream() {
  let relay = Relay::<i32>::new();
  let log = Log::<i32, Rejected>::default();
  let handle = relay
    .clone()
    .try_map(|v| if v < 0 { Err(Rejected(v)) } else { Ok(v * 10) })
    .actual_subscribe(recorder(&log));

  relay.push(1);
  relay.push(-2);
  relay.push(3);

  assert_eq!(*log.borrow(), vec![Event::Next(10), Event::Error(Rejected(-2))]);
  assert!(!relay.has_subscriber());
  assert!(handle.is_closed());
}

#[test]
fn cancelling_twice_is_a_no_op() {
  TestScheduler::init();
  let ticks = Rc::new(Cell::new(0));
  let t = ticks.clone();
  let handle = observable::interval(ms(100), |n| n, TestScheduler).subscribe(move |_| t.set(t.get() + 1));

  TestScheduler::advance_by(ms(250));
  assert_eq!(ticks.get(), 2);

  handle.cancel();
  let pending = TestScheduler::pending_count();
  handle.clone().unsubscribe();
  handle.unsubscribe();

  assert_eq!(TestScheduler::pending_count(), pending);
  assert_eq!(pending, 0);
  TestScheduler::advance_by(ms(1_000));
  assert_eq!(ticks.get(), 2);
}

#[test]
fn single_shot_source_emits_once_then_completes() {
  let log = Log::<&str, Infallible>::default();
  let handle = observable::of("just").actual_subscribe(recorder(&log));

  assert_eq!(*log.borrow(), vec![Event::Next("just"), Event::Complete]);
  assert!(handle.is_closed());
}

#[test]
fn throttled_stream_emits_once_per_window() {
  TestScheduler::init();
  let relay = Relay::<u32>::new();
  let seen = Rc::new(RefCell::new(vec![]));
  let s = seen.clone();
  relay
    .clone()
    .throttle_time(ms(100), ThrottleEdge::Leading, TestScheduler)
    .subscribe(move |v| s.borrow_mut().push(v));

  for v in 0..10 {
    relay.push(v);
    TestScheduler::advance_by(ms(25));
  }
  assert_eq!(*seen.borrow(), vec![0, 4, 8]);
}
