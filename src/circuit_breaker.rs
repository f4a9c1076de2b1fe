use failsafe::{backoff, failure_policy, Config, StateMachine};
use std::time::Duration;

/// Concrete breaker type guarding one indicator source, nameable so the
/// fetcher can hold one per source across requests.
pub type SourceBreaker =
    StateMachine<failure_policy::ConsecutiveFailures<backoff::Exponential>, ()>;

/// Creates a circuit breaker for one external indicator source.
///
/// 5 consecutive failures open the circuit; recovery is retried with an
/// exponential backoff between 10s and 60s. An open circuit makes the
/// source count as unavailable for the scoring run, which downstream code
/// already treats as "no data", never as an error.
pub fn create_source_circuit_breaker() -> SourceBreaker {
    let backoff_strategy = backoff::exponential(
        Duration::from_secs(10), // Initial delay
        Duration::from_secs(60), // Maximum delay
    );

    let failure_policy = failure_policy::consecutive_failures(5, backoff_strategy);

    Config::new().failure_policy(failure_policy).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use failsafe::{CircuitBreaker, Error};

    #[test]
    fn test_circuit_breaker_opens_after_failures() {
        let cb = create_source_circuit_breaker();

        // Simulate 5 consecutive failures
        for _ in 0..5 {
            let result: Result<(), Error<&str>> = cb.call(|| Err::<(), &str>("simulated error"));
            assert!(result.is_err());
        }

        // Next call should be rejected (circuit is open)
        let result: Result<(), Error<&str>> = cb.call(|| Ok::<(), &str>(()));
        assert!(matches!(result, Err(Error::Rejected)));
    }

    #[test]
    fn test_circuit_breaker_stays_closed_on_success() {
        let cb = create_source_circuit_breaker();

        for _ in 0..10 {
            let result: Result<(), Error<&str>> = cb.call(|| Ok::<(), &str>(()));
            assert!(result.is_ok());
        }
    }
}
