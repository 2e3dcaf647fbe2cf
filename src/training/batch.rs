//! Data-parallel mini-batch trainer.
//!
//! One authoritative network plus a fixed pool of persistent worker
//! threads, each owning a structurally identical replica. Workers and the
//! orchestrator communicate exclusively over bounded channels; gradient
//! buffers travel with the work items, so every buffer has exactly one
//! owner at any point and no locks are needed.
//!
//! Per mini-batch the protocol is: broadcast the authoritative weights,
//! partition the batch into contiguous chunks, dispatch one chunk per
//! buffer, wait until every dispatched chunk has been returned (the join
//! barrier counts work items, not workers), reduce the returned buffers
//! into the global accumulator by plain summation, and apply a single
//! optimizer step per synapse from the batch-averaged gradient. Summation
//! is commutative, so the result does not depend on how the batch was
//! partitioned or in which order the workers finished.

use std::ops::Range;
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::NetworkError;
use crate::network::Network;
use crate::optimizers::Optimizer;
use crate::training::{
    accumulate_gradients, compute_deltas, cross_validate, delta_buffer, validate_examples, Example,
};

/// One chunk of a mini-batch, together with everything a worker needs to
/// process it: the weight snapshot for this batch, the shuffled example
/// order, and a zeroed gradient buffer the worker accumulates into and
/// sends back as its completion signal.
struct WorkItem {
    chunk: usize,
    weights: Arc<Vec<f64>>,
    data: Arc<Vec<Example>>,
    order: Arc<Vec<usize>>,
    range: Range<usize>,
    grads: Vec<f64>,
}

/// Completion signal: the chunk index and the filled gradient buffer.
type Completion = (usize, Vec<f64>);

/// Mini-batch trainer with a persistent worker pool.
///
/// With `parallelism` 1 the trainer degrades to plain synchronous
/// mini-batch gradient descent; larger values distribute the forward and
/// backward passes of each batch across worker threads while keeping the
/// optimizer step equivalent within floating tolerance.
pub struct BatchTrainer<O> {
    optimizer: O,
    l2: f64,
    batch_size: usize,
    parallelism: usize,
    verbosity: usize,
}

impl<O: Optimizer> BatchTrainer<O> {
    /// New batch trainer.
    ///
    /// `batch_size` and `parallelism` are clamped to at least 1. `l2` and
    /// `verbosity` behave as in [`crate::training::Trainer::new`].
    pub fn new(
        optimizer: O,
        l2: f64,
        batch_size: usize,
        parallelism: usize,
        verbosity: usize,
    ) -> Self {
        BatchTrainer {
            optimizer,
            l2,
            batch_size: batch_size.max(1),
            parallelism: parallelism.max(1),
            verbosity,
        }
    }

    /// Train `net` for `iterations` passes over `examples`, one optimizer
    /// step per mini-batch.
    ///
    /// Worker threads live for the duration of this call and block on the
    /// work queue between batches; they shut down when the queue
    /// disconnects and are joined before returning. A worker panic is not
    /// recoverable and propagates as a panic here.
    pub fn train(
        &mut self,
        net: &mut Network,
        examples: &[Example],
        validation: &[Example],
        iterations: usize,
        rng: &mut StdRng,
    ) -> Result<(), NetworkError> {
        validate_examples(net, examples)?;
        validate_examples(net, validation)?;
        if examples.is_empty() {
            return Ok(());
        }

        let weight_count = net.num_weights();
        self.optimizer.init(weight_count);
        let l2 = self.l2 / net.config().inputs as f64;

        let (work_tx, work_rx) = bounded::<WorkItem>(self.parallelism);
        let (done_tx, done_rx) = bounded::<Completion>(self.parallelism);

        // replicas draw from a derived generator so that the number of
        // draws taken from `rng` does not depend on the parallelism
        // degree; the shuffle sequence is then identical for any P
        let mut replica_rng = StdRng::seed_from_u64(rng.random::<u64>());
        let mut workers = Vec::with_capacity(self.parallelism);
        for _ in 0..self.parallelism {
            let replica = Network::new(net.config(), &mut replica_rng)?;
            let work_rx = work_rx.clone();
            let done_tx = done_tx.clone();
            workers.push(thread::spawn(move || worker_loop(replica, work_rx, done_tx)));
        }
        drop(work_rx);
        drop(done_tx);

        // one gradient buffer per worker, allocated once and recycled
        let mut pool: Vec<Vec<f64>> = (0..self.parallelism)
            .map(|_| vec![0.0; weight_count])
            .collect();
        let mut accumulated = vec![0.0; weight_count];

        let data = Arc::new(examples.to_vec());
        let mut order: Vec<usize> = (0..data.len()).collect();

        let start = Instant::now();
        for iteration in 1..=iterations {
            order.shuffle(rng);
            let order = Arc::new(order.clone());

            let mut cursor = 0;
            while cursor < order.len() {
                let batch = cursor..(cursor + self.batch_size).min(order.len());
                cursor = batch.end;
                self.run_batch(
                    net,
                    &work_tx,
                    &done_rx,
                    &data,
                    &order,
                    batch,
                    &mut pool,
                    &mut accumulated,
                    l2,
                    iteration,
                );
            }

            if self.verbosity > 0 && iteration % self.verbosity == 0 && !validation.is_empty() {
                let loss = cross_validate(net, validation)?;
                info!(
                    "iteration {iteration}/{iterations}: validation loss {loss:.5} ({:.2?})",
                    start.elapsed()
                );
            }
        }

        drop(work_tx);
        for worker in workers {
            worker.join().expect("worker thread panicked");
        }
        Ok(())
    }

    /// One mini-batch: broadcast, dispatch, barrier, reduce, update.
    #[allow(clippy::too_many_arguments)]
    fn run_batch(
        &mut self,
        net: &mut Network,
        work_tx: &Sender<WorkItem>,
        done_rx: &Receiver<Completion>,
        data: &Arc<Vec<Example>>,
        order: &Arc<Vec<usize>>,
        batch: Range<usize>,
        pool: &mut Vec<Vec<f64>>,
        accumulated: &mut [f64],
        l2: f64,
        iteration: usize,
    ) {
        let batch_len = batch.len();
        let weights = Arc::new(net.weight_vector());

        // contiguous partition into at most `parallelism` chunks
        let chunk_size = batch_len.div_ceil(self.parallelism);
        let mut dispatched = 0;
        let mut chunk_start = batch.start;
        while chunk_start < batch.end {
            let chunk_end = (chunk_start + chunk_size).min(batch.end);
            let grads = pool.pop().expect("one buffer per worker is always pooled");
            work_tx
                .send(WorkItem {
                    chunk: dispatched,
                    weights: weights.clone(),
                    data: data.clone(),
                    order: order.clone(),
                    range: chunk_start..chunk_end,
                    grads,
                })
                .expect("worker pool disconnected");
            dispatched += 1;
            chunk_start = chunk_end;
        }

        // join barrier: every dispatched work item must come back
        let mut returned: Vec<Option<Vec<f64>>> = (0..dispatched).map(|_| None).collect();
        for _ in 0..dispatched {
            let (chunk, grads) = done_rx.recv().expect("worker terminated early");
            returned[chunk] = Some(grads);
        }

        // reduce in chunk order, re-zero the buffers and return them
        for mut grads in returned.into_iter().flatten() {
            for (acc, g) in accumulated.iter_mut().zip(grads.iter_mut()) {
                *acc += *g;
                *g = 0.0;
            }
            pool.push(grads);
        }

        // single synchronized optimizer step from the averaged gradient
        let (arena, layers) = net.parts_mut();
        let mut idx = 0;
        for layer in layers.iter() {
            for neuron in &layer.neurons {
                for &id in &neuron.incoming {
                    let synapse = &mut arena[id];
                    let mut gradient = accumulated[idx] / batch_len as f64;
                    if !synapse.is_bias {
                        gradient += l2 * synapse.weight;
                    }
                    let delta = self
                        .optimizer
                        .update(synapse.weight, gradient, iteration, idx);
                    synapse.weight += delta;
                    accumulated[idx] = 0.0;
                    idx += 1;
                }
            }
        }
    }
}

/// Worker: applies the broadcast weights to its replica, then runs forward
/// and backward for every example in its chunk, accumulating raw gradients
/// into the travelling buffer. Exits when the work queue disconnects.
fn worker_loop(mut replica: Network, work: Receiver<WorkItem>, done: Sender<Completion>) {
    let mut deltas = delta_buffer(&replica);
    while let Ok(mut item) = work.recv() {
        replica.set_weight_vector(&item.weights);
        for &i in &item.order[item.range.clone()] {
            let example = &item.data[i];
            replica.propagate(&example.input);
            compute_deltas(&replica, &example.response, &mut deltas);
            accumulate_gradients(&replica, &deltas, &mut item.grads);
        }
        if done.send((item.chunk, item.grads)).is_err() {
            break;
        }
    }
}
