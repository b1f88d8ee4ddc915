use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use interpose_container::{Component, ResolveError, ServiceCollection, ServiceProvider, TypeKey};
use interpose_interception::{
    contract, CallResult, Contract, FnConvention, InterceptError,
    InterceptionServiceCollectionExt, Interceptor, Invocation, LogInterceptor,
    MethodSelectionConvention, RetryInterceptor, RetryPolicy, TimingInterceptor, TimingRecorder,
    Value,
};
use parking_lot::Mutex;

contract! {
    pub trait Greeter {
        fn greet(&self, name: String) -> String;
        fn join(&self, first: String, second: String) -> String;
        fn reset(&self);
    }
}

contract! {
    pub trait Meter {
        fn ratio(&self) -> f64;
        fn echo(&self, value: Option<Option<u8>>) -> String;
    }
}

#[derive(Default)]
struct Journal {
    entries: Mutex<Vec<String>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    fn count(&self, entry: &str) -> usize {
        self.entries.lock().iter().filter(|e| *e == entry).count()
    }
}

struct SampleGreeter {
    journal: Arc<Journal>,
}

impl Component for SampleGreeter {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Self {
            journal: provider.resolve::<Journal>()?,
        })
    }
}

impl Greeter for SampleGreeter {
    fn greet(&self, name: String) -> CallResult<String> {
        self.journal.push("impl");
        Ok(format!("Hello, {}", name))
    }

    fn join(&self, first: String, second: String) -> CallResult<String> {
        self.journal.push("impl");
        Ok(format!("{} & {}", first, second))
    }

    fn reset(&self) -> CallResult<()> {
        self.journal.push("reset");
        Ok(())
    }
}

/// Fails every greeting with an I/O error.
struct DisconnectedGreeter;

impl Component for DisconnectedGreeter {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(DisconnectedGreeter)
    }
}

impl Greeter for DisconnectedGreeter {
    fn greet(&self, _name: String) -> CallResult<String> {
        Err(InterceptError::source(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "peer went away",
        )))
    }

    fn join(&self, first: String, second: String) -> CallResult<String> {
        Ok(format!("{} & {}", first, second))
    }

    fn reset(&self) -> CallResult<()> {
        Ok(())
    }
}

struct NanMeter;

impl Component for NanMeter {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(NanMeter)
    }
}

impl Meter for NanMeter {
    fn ratio(&self) -> CallResult<f64> {
        Ok(f64::NAN)
    }

    fn echo(&self, value: Option<Option<u8>>) -> CallResult<String> {
        Ok(format!("{:?}", value))
    }
}

/// Fails the first `FLAKY_FAILURES` greetings.
struct FlakyGreeter {
    journal: Arc<Journal>,
    attempts: AtomicU32,
}

const FLAKY_FAILURES: u32 = 2;

impl Component for FlakyGreeter {
    fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Self {
            journal: provider.resolve::<Journal>()?,
            attempts: AtomicU32::new(0),
        })
    }
}

impl Greeter for FlakyGreeter {
    fn greet(&self, name: String) -> CallResult<String> {
        self.journal.push("impl");
        if self.attempts.fetch_add(1, Ordering::SeqCst) < FLAKY_FAILURES {
            return Err(InterceptError::failure("backend unavailable"));
        }
        Ok(format!("Hello, {}", name))
    }

    fn join(&self, first: String, second: String) -> CallResult<String> {
        Ok(format!("{} & {}", first, second))
    }

    fn reset(&self) -> CallResult<()> {
        Ok(())
    }
}

macro_rules! recording {
    ($($name:ident),*) => {$(
        struct $name {
            journal: Arc<Journal>,
        }

        impl Component for $name {
            fn create(provider: &ServiceProvider) -> Result<Self, ResolveError> {
                Ok(Self {
                    journal: provider.resolve::<Journal>()?,
                })
            }
        }

        impl Interceptor for $name {
            fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
                self.journal.push(stringify!($name));
                invocation.proceed()
            }
        }
    )*};
}

recording!(A, B, C);

struct Uppercase;

impl Component for Uppercase {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(Uppercase)
    }
}

impl Interceptor for Uppercase {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        let output = invocation.proceed()?;
        match output.downcast_ref::<String>() {
            Some(text) => Ok(Value::new(text.to_uppercase())),
            None => Ok(output),
        }
    }
}

struct ShortCircuit;

impl Component for ShortCircuit {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(ShortCircuit)
    }
}

impl Interceptor for ShortCircuit {
    fn intercept(&self, _invocation: &mut Invocation<'_>) -> CallResult<Value> {
        Ok(Value::new("blocked".to_string()))
    }
}

struct RenameToBob;

impl Component for RenameToBob {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Ok(RenameToBob)
    }
}

impl Interceptor for RenameToBob {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        if let Some(first) = invocation.arguments_mut().first_mut() {
            *first = Value::new("Bob".to_string());
        }
        invocation.proceed()
    }
}

struct Unresolvable;

impl Component for Unresolvable {
    fn create(_provider: &ServiceProvider) -> Result<Self, ResolveError> {
        Err(ResolveError::construction::<Unresolvable>("no backend configured"))
    }
}

impl Interceptor for Unresolvable {
    fn intercept(&self, invocation: &mut Invocation<'_>) -> CallResult<Value> {
        invocation.proceed()
    }
}

/// Skips `B` when the first argument is `"skip-me"`.
#[derive(Default)]
struct SkipBForSkipMe;

impl MethodSelectionConvention for SkipBForSkipMe {
    fn has_support(&self, invocation: &Invocation<'_>) -> CallResult<bool> {
        let skip = invocation.interceptor() == Some(TypeKey::of::<B>())
            && invocation.argument_ref::<String>(0).map_or(false, |name| name == "skip-me");
        Ok(!skip)
    }
}

#[derive(Default)]
struct FaultyConvention;

impl MethodSelectionConvention for FaultyConvention {
    fn has_support(&self, invocation: &Invocation<'_>) -> CallResult<bool> {
        Err(InterceptError::convention(
            invocation.method(),
            "cannot classify call",
        ))
    }
}

fn services_with_journal() -> (ServiceCollection, Arc<Journal>) {
    let journal = Arc::new(Journal::default());
    let mut services = ServiceCollection::new();
    services.add_instance(Arc::clone(&journal));
    (services, journal)
}

#[test]
fn interceptors_run_in_declared_order_before_the_implementation() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<B>().then_by::<C>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "Hello, Ann");
    assert_eq!(journal.entries(), vec!["A", "B", "C", "impl"]);
}

#[test]
fn zero_interceptors_pass_straight_through() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|_| {});
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "Hello, Ann");
    assert_eq!(journal.entries(), vec!["impl"]);
}

#[test]
fn uppercase_interceptor_rewrites_the_result() {
    let (mut services, _journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<Uppercase>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "HELLO, ANN");
}

#[test]
fn short_circuit_never_reaches_the_implementation() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<ShortCircuit>().then_by::<A>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "blocked");
    assert_eq!(journal.count("impl"), 0);
    assert_eq!(journal.count("A"), 0);
}

#[test]
fn convention_skips_a_single_stage_per_call() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>()
            .then_by::<B>()
            .use_method_selection_convention::<SkipBForSkipMe>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.greet("skip-me".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["A", "impl"]);

    greeter.greet("Ann".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["A", "impl", "A", "B", "impl"]);
}

#[test]
fn skipped_middle_stage_leaves_outer_and_inner_stages_running() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>()
            .then_by::<B>()
            .then_by::<C>()
            .with_convention(FnConvention::new(|invocation: &Invocation<'_>| -> CallResult<bool> {
                let skip = invocation.interceptor() == Some(TypeKey::of::<B>())
                    && invocation.argument_as::<String>("name")? == "skip-me";
                Ok(!skip)
            }));
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.greet("skip-me".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["A", "C", "impl"]);

    greeter.greet("Ann".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["A", "C", "impl", "A", "B", "C", "impl"]);
}

#[test]
fn convention_failure_fails_the_call() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>()
            .use_method_selection_convention::<FaultyConvention>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    let err = greeter.greet("Ann".to_string()).unwrap_err();
    assert!(matches!(err, InterceptError::Convention { .. }));
    assert!(journal.entries().is_empty());
}

#[test]
fn unresolvable_interceptor_aborts_proxy_construction() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<Unresolvable>();
    });
    let provider = services.build();

    let err = match provider.resolve::<dyn Greeter>() {
        Ok(_) => panic!("proxy must not be built"),
        Err(err) => err,
    };
    assert!(matches!(err, ResolveError::Construction { .. }));
    assert!(err.type_name().ends_with("Unresolvable"));
    assert!(journal.entries().is_empty());
}

#[test]
fn unregistered_implementation_dependency_aborts_proxy_construction() {
    let mut services = ServiceCollection::new();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<Uppercase>();
    });
    let provider = services.build();

    let err = match provider.resolve::<dyn Greeter>() {
        Ok(_) => panic!("proxy must not be built"),
        Err(err) => err,
    };
    assert!(matches!(err, ResolveError::NotRegistered { .. }));
}

#[test]
fn implementation_failures_propagate_unchanged() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, FlakyGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<Uppercase>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    let err = greeter.greet("Ann".to_string()).unwrap_err();
    assert_eq!(err.to_string(), "backend unavailable");
    assert_eq!(journal.entries(), vec!["A", "impl"]);
}

#[test]
fn source_errors_reach_the_caller_intact() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, DisconnectedGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<Uppercase>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    let err = greeter.greet("Ann".to_string()).unwrap_err();
    assert!(matches!(err, InterceptError::Source(_)));
    assert!(err.is_retryable());
    assert_eq!(err.to_string(), "peer went away");
    assert_eq!(journal.entries(), vec!["A"]);
}

#[test]
fn values_cross_an_empty_chain_unchanged() {
    let mut services = ServiceCollection::new();
    services.add_transient_with_interception::<dyn Meter, NanMeter, _>(|_| {});
    let meter = services.build().resolve::<dyn Meter>().unwrap();

    assert!(meter.ratio().unwrap().is_nan());
    assert_eq!(meter.echo(Some(None)).unwrap(), "Some(None)");
    assert_eq!(meter.echo(Some(Some(7))).unwrap(), "Some(Some(7))");
    assert_eq!(meter.echo(None).unwrap(), "None");
}

#[test]
fn contracts_list_their_members_in_declaration_order() {
    let members: Vec<_> = <dyn Greeter as Contract>::methods()
        .iter()
        .map(|method| (method.name(), method.parameters().to_vec()))
        .collect();
    assert_eq!(
        members,
        vec![
            ("greet", vec!["name"]),
            ("join", vec!["first", "second"]),
            ("reset", vec![]),
        ]
    );
    assert_eq!(<dyn Meter as Contract>::methods()[0].contract(), "Meter");
}

#[test]
fn retry_interceptor_proceeds_again_after_failures() {
    let (mut services, journal) = services_with_journal();
    services.add_instance(Arc::new(RetryPolicy { max_retries: 3 }));
    services.add_transient_with_interception::<dyn Greeter, FlakyGreeter, _>(|m| {
        m.intercept_by::<RetryInterceptor>().then_by::<A>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "Hello, Ann");
    assert_eq!(journal.count("A"), 3);
    assert_eq!(journal.count("impl"), 3);
}

#[test]
fn retry_interceptor_gives_up_after_its_budget() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, FlakyGreeter, _>(|m| {
        m.intercept_by::<RetryInterceptor>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    let err = greeter.greet("Ann".to_string()).unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(journal.count("impl"), 2);
}

#[test]
fn rewritten_arguments_reach_the_implementation() {
    let (mut services, _journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<RenameToBob>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "Hello, Bob");
    assert_eq!(
        greeter.join("Ann".to_string(), "Cid".to_string()).unwrap(),
        "Bob & Cid"
    );
}

#[test]
fn unit_members_are_intercepted() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.reset().unwrap();
    assert_eq!(journal.entries(), vec!["A", "reset"]);
}

#[test]
fn second_intercept_by_starts_a_new_chain() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<B>();
        m.intercept_by::<C>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.greet("Ann".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["C", "impl"]);
}

#[test]
fn duplicate_interceptor_runs_once() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<B>().then_by::<A>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.greet("Ann".to_string()).unwrap();
    assert_eq!(journal.entries(), vec!["A", "B", "impl"]);
}

#[test]
fn transient_registrations_build_independent_proxies() {
    let (mut services, _journal) = services_with_journal();
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>();
    });
    let provider = services.build();

    let first = provider.resolve::<dyn Greeter>().unwrap();
    let second = provider.resolve::<dyn Greeter>().unwrap();
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
fn singleton_registrations_share_one_proxy() {
    let (mut services, _journal) = services_with_journal();
    services.add_singleton_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>();
    });
    let provider = services.build();

    let first = provider.resolve::<dyn Greeter>().unwrap();
    let second = provider.resolve::<dyn Greeter>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn instrumentation_registers_log_interceptor() {
    let (mut services, journal) = services_with_journal();
    services.add_transient_with_instrumentation::<dyn Greeter, SampleGreeter>();
    assert!(services.contains::<LogInterceptor>());

    let greeter = services.build().resolve::<dyn Greeter>().unwrap();
    assert_eq!(greeter.greet("Ann".to_string()).unwrap(), "Hello, Ann");
    assert_eq!(journal.entries(), vec!["impl"]);
}

#[test]
fn timing_interceptor_records_into_shared_recorder() {
    let (mut services, _journal) = services_with_journal();
    let recorder = Arc::new(TimingRecorder::new());
    services.add_instance(Arc::clone(&recorder));
    services.add_transient_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<TimingInterceptor>().then_by::<Uppercase>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    greeter.greet("Ann".to_string()).unwrap();
    greeter.greet("Cid".to_string()).unwrap();
    greeter.reset().unwrap();

    assert_eq!(recorder.calls("Greeter::greet"), 2);
    assert_eq!(recorder.calls("Greeter::reset"), 1);
}

#[test]
fn concurrent_calls_share_interceptor_instances() {
    let (mut services, journal) = services_with_journal();
    services.add_singleton_with_interception::<dyn Greeter, SampleGreeter, _>(|m| {
        m.intercept_by::<A>().then_by::<Uppercase>();
    });
    let greeter = services.build().resolve::<dyn Greeter>().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let greeter = Arc::clone(&greeter);
            std::thread::spawn(move || greeter.greet(format!("guest{}", i)))
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        let greeting = handle.join().unwrap().unwrap();
        assert_eq!(greeting, format!("HELLO, GUEST{}", i));
    }
    assert_eq!(journal.count("A"), 8);
    assert_eq!(journal.count("impl"), 8);
}
