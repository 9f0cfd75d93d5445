// HTTP-level tests against a mock backend.

mod support;
mod dispatcher_test;
