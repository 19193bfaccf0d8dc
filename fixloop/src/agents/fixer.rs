//! Fixer role: proposes a corrected program from diagnostic context.

use crate::agents::{OutputShape, RoleAgent, RoleSpec};
use crate::io::reasoning::ReasoningClient;

pub const FIXER: RoleSpec = RoleSpec {
    label: "Expert Code Fixer",
    instructions: include_str!("prompts/fixer.md"),
    output: OutputShape::Code,
};

#[derive(Debug, Clone)]
pub struct Fixer {
    agent: RoleAgent,
}

impl Fixer {
    pub fn new(snippet_chars: usize) -> Self {
        Self {
            agent: RoleAgent::new(FIXER, snippet_chars),
        }
    }

    /// Propose a fix for `original` given `context`.
    ///
    /// `context` is the analysis report on the first attempt and retry
    /// feedback afterwards. The raw reply is returned; extracting code from it
    /// is the coordinator's job.
    pub fn fix<C: ReasoningClient + ?Sized>(
        &mut self,
        client: &C,
        context: &str,
        original: &str,
    ) -> String {
        let task = format!(
            "Fix the code based on the bug report.\n\
             Return ONLY clean Python code.\n\n\
             BUG REPORT:\n{}\n\n\
             ORIGINAL CODE:\n{original}\n\n\
             Start your output with:\n# Fixed code",
            context.trim()
        );
        self.agent.think(client, &task)
    }

    pub fn reset_memory(&mut self) {
        self.agent.reset_memory();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedReasoner;

    #[test]
    fn fix_embeds_context_and_original() {
        let client = ScriptedReasoner::new().reply(FIXER.label, "# Fixed code\nprint(1)");
        let mut fixer = Fixer::new(200);

        let reply = fixer.fix(&client, "  Previous attempt failed.  ", "print(1");
        assert_eq!(reply, "# Fixed code\nprint(1)");
        let task = &client.requests()[0].task;
        assert!(task.contains("BUG REPORT:\nPrevious attempt failed.\n"));
        assert!(task.contains("ORIGINAL CODE:\nprint(1"));
    }
}
