// Jobs: persisted job applications and the worker handoff around the
// tailoring pipeline.
//
// The status machine (pending -> processing -> completed | failed, requeue
// -> pending) is driven by an external worker: it pops job ids from the
// Redis queue, marks the job processing, calls the tailoring endpoints with
// the stored snapshot, then PATCHes the outputs and final status back. This
// module owns storage, legal transitions, and the queue handoff.
//
// A job id may appear on the queue twice (requeue of a still-pending job).
// That is harmless: the worker's pending -> processing write is the claim,
// and the second claim fails the transition check.

pub mod handlers;
pub mod queue;
pub mod store;
