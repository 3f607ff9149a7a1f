//! Core Agent trait definition

use crate::{Context, Result};
use async_trait::async_trait;

/// Trait implemented by every agent the crew can call
///
/// Input and output are plain strings: the crew hands over a request
/// (usually a ticker) and receives a text block it can paste into its
/// own reasoning.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short description of what the agent answers
    fn description(&self) -> &str {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Agent for Echo {
        async fn process(&self, input: String, context: &mut Context) -> Result<String> {
            context.set_symbol(input.clone());
            Ok(input)
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    #[test]
    fn test_default_description_and_context_mutation() {
        let agent = Echo;
        let mut ctx = Context::new();

        let out = tokio_test::block_on(agent.process("HPG".to_string(), &mut ctx)).unwrap();
        assert_eq!(out, "HPG");
        assert_eq!(ctx.symbol(), Some("HPG"));
        assert_eq!(agent.description(), "");
    }
}
