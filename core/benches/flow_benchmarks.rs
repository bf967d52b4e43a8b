use carpluto_flow::{Flow, FlowData, FlowError, FlowRegistry, StepControl, StepDef};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::future::ready;
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
  skip_odd: bool,
}

fn counting_flow(step_count: usize, iterations: u64) -> Flow<BenchContext, FlowError> {
  let steps = (0..step_count).map(|i| StepDef::required(format!("step_{i}"))).collect();
  let mut flow = Flow::new("bench_counting", steps);
  for i in 0..step_count {
    flow
      .on(&format!("step_{i}"), move |ctx: FlowData<BenchContext>| {
        ctx.update(|c| {
          for _ in 0..iterations {
            c.counter = c.counter.wrapping_add(1);
          }
        });
        ready(Ok::<_, FlowError>(StepControl::Continue))
      })
      .expect("step exists");
  }
  flow
}

fn yielding_flow(step_count: usize) -> Flow<BenchContext, FlowError> {
  let steps = (0..step_count).map(|i| StepDef::required(format!("step_{i}"))).collect();
  let mut flow = Flow::new("bench_yielding", steps);
  for i in 0..step_count {
    flow
      .on(&format!("step_{i}"), |ctx: FlowData<BenchContext>| async move {
        tokio::task::yield_now().await;
        ctx.update(|c| c.counter += 1);
        Ok::<_, FlowError>(StepControl::Continue)
      })
      .expect("step exists");
  }
  flow
}

fn bench_sequential_steps(c: &mut Criterion) {
  let rt = Runtime::new().expect("tokio runtime");
  let mut group = c.benchmark_group("sequential_steps");

  for step_count in [1usize, 5, 20] {
    let flow = counting_flow(step_count, 10);
    group.throughput(Throughput::Elements(step_count as u64));
    group.bench_with_input(BenchmarkId::from_parameter(step_count), &step_count, |b, _| {
      b.to_async(&rt).iter(|| async {
        let data = FlowData::new(BenchContext::default());
        flow.run(data).await.expect("flow completes")
      });
    });
  }
  group.finish();
}

fn bench_async_handlers(c: &mut Criterion) {
  let rt = Runtime::new().expect("tokio runtime");
  let flow = yielding_flow(5);

  c.bench_function("async_handlers_5_steps", |b| {
    b.to_async(&rt).iter(|| async {
      let data = FlowData::new(BenchContext::default());
      flow.run(data).await.expect("flow completes")
    });
  });
}

fn bench_skip_conditions(c: &mut Criterion) {
  let rt = Runtime::new().expect("tokio runtime");
  let mut flow = counting_flow(10, 1);
  for i in (1..10).step_by(2) {
    flow
      .skip_if(&format!("step_{i}"), |data: &FlowData<BenchContext>| data.with(|c| c.skip_odd))
      .expect("step exists");
  }

  c.bench_function("skip_half_of_10_steps", |b| {
    b.to_async(&rt).iter(|| async {
      let data = FlowData::new(BenchContext {
        skip_odd: true,
        ..Default::default()
      });
      flow.run(data).await.expect("flow completes")
    });
  });
}

fn bench_registry_dispatch(c: &mut Criterion) {
  let rt = Runtime::new().expect("tokio runtime");
  let registry: FlowRegistry<FlowError> = FlowRegistry::new();
  registry.register(counting_flow(3, 1));

  c.bench_function("registry_dispatch_3_steps", |b| {
    b.to_async(&rt).iter(|| async {
      let data = FlowData::new(BenchContext::default());
      registry.run(data).await.expect("flow completes")
    });
  });
}

criterion_group!(
  benches,
  bench_sequential_steps,
  bench_async_handlers,
  bench_skip_conditions,
  bench_registry_dispatch
);
criterion_main!(benches);
