use anyhow::anyhow;

/// Whether an in-memory port fake should behave as if its backing store is reachable.
/// Disconnected fakes fail every call, which is how tests exercise storage failures.
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    /// Return an error if connectivity is in a "disconnected" state
    pub fn blow_up_if_disconnected(&self) -> Result<(), anyhow::Error> {
        match self {
            Self::Connected => Ok(()),
            Self::Disconnected => Err(anyhow!("could not connect to the database!")),
        }
    }
}

/// Captures the arguments of every call to a mocked trait method and hands back a
/// preconfigured result. Hand-written port mocks are built on top of this.
///
/// * `Args` is the tuple of captured arguments for a single call
/// * `Ret` is the method's return type
///
/// ```ignore
/// impl TodoPort for Mutex<MockTodoService> {
///     async fn read_todos(&self, prev_id: i64, size: i64, /* ... */) -> Result<Vec<Todo>, TodoError> {
///         let mut locked_self = self.lock().unwrap();
///         locked_self.read_todos_result.save_arguments((prev_id, size));
///         locked_self.read_todos_result.return_value_result()
///     }
/// }
/// ```
pub struct FakeImplementation<Args, Ret> {
    saved_arguments: Vec<Args>,
    return_value: Option<Ret>,
}

impl<Args, Ret> FakeImplementation<Args, Ret> {
    pub fn new() -> FakeImplementation<Args, Ret> {
        FakeImplementation {
            saved_arguments: Vec::new(),
            return_value: None,
        }
    }

    /// Saves arguments from a single invocation of the FakeImplementation
    pub fn save_arguments(&mut self, arguments: Args) {
        self.saved_arguments.push(arguments)
    }

    /// Returns the list of arguments passed on every call to this FakeImplementation
    pub fn calls(&self) -> &[Args] {
        self.saved_arguments.as_slice()
    }
}

impl<Args, Success, Fail> FakeImplementation<Args, Result<Success, Fail>>
where
    Success: Clone,
    Fail: Clone,
{
    /// Set the result that should be returned when this FakeImplementation is invoked
    pub fn set_returned_result(&mut self, return_value: Result<Success, Fail>) {
        self.return_value = Some(return_value);
    }

    /// Retrieve a copy of the configured result. Panics if no result was configured, since
    /// that means the test called something it didn't expect to.
    pub fn return_value_result(&self) -> Result<Success, Fail> {
        match self.return_value {
            Some(Ok(ref ok_result)) => Ok(ok_result.clone()),
            Some(Err(ref err)) => Err(err.clone()),
            None => panic!("Tried to return from a function where the return value wasn't set!"),
        }
    }
}
