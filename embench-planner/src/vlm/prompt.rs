//! Prompt templates and rendering.
use embench_core::Feedback;

/// System prompt of TEACh household tasks.
///
/// The placeholders are filled with the largest action id, the list of
/// actions and the few-shot examples, in this order.
pub const TEACH_SYSTEM_PROMPT: &str = "## You are a robot operating in a home. Given a task, you must accomplish the task using a defined set of actions to achieve the desired outcome.

## Action Descriptions and Validity Rules
\u{2022} MoveAhead: Move forward.
\u{2022} MoveBack: Move backward.
\u{2022} Turn Left: Turn 90 degrees left.
\u{2022} Turn Right: Turn 90 degrees right.
\u{2022} Look Up: Look up 30 degrees.
\u{2022} Look Down: Look down 30 degrees.
\u{2022} Pickup: Parameterized by the object ID. Pick up the object.
\u{2022} Place: Parameterized by the receptacle ID. Place the held object.
\u{2022} Open: Parameterized by the object ID. Open the object.
\u{2022} Close: Parameterized by the object ID. Close the object.
\u{2022} ToggleOn: Parameterized by the object ID. Turn on the object.
\u{2022} ToggleOff: Parameterized by the object ID. Turn off the object.
\u{2022} Slice: Parameterized by the object ID. Slice the object.
\u{2022} Pour: Parameterized by the object ID. Pour liquid from the held object.

## The available action id (0 ~ {}) and action names are: {}.

{}

## Guidelines
1. **Output Plan**: Avoid generating empty plan. Each plan should include no more than 20 actions.
2. **Visibility**: Always locate a visible object by the 'find' action before interacting with it.
3. **Action Guidelines**: Make sure match the action name and its corresponding action id in the output.
4. **Prevent Repeating Action Sequences**: Do not repeatedly execute the same action or sequence of actions.
5. **Reflection**: Use interaction history and feedback from the environment to refine and improve your current plan.
";

/// Output format appended to prompts carrying an image.
pub const OUTPUT_TEMPLATE: &str = "
The output json format should be {'visual_state_description':str, 'reasoning_and_reflection':str, 'language_plan':str, 'executable_plan':List[{'action_id':int, 'action_name':str}...]}
The fields in above JSON follows the purpose below:
1. visual_state_description is for description of current state from the visual image,
2. reasoning_and_reflection is for summarizing the history of interactions and any available environmental feedback. Additionally, provide reasoning as to why the last action or plan failed and did not finish the task,
3. language_plan is for describing a list of actions to achieve the user instruction. Each action is started by the step number and the action name,
4. executable_plan is a list of actions needed to achieve the user instruction, with each action having an action ID and a name.
5. keep your plan efficient and concise.
!!! When generating content for JSON strings, avoid using any contractions or abbreviated forms (like 's, 're, 've, 'll, 'd, n't) that use apostrophes. Instead, write out full forms (e.g., is, are, have, will, would, not) to prevent parsing errors in JSON. Please do not output any other thing more than the above-mentioned JSON, do not include ```json and ```!!!.
";

/// Output format appended to text-only prompts.
pub const OUTPUT_TEMPLATE_LANG: &str = "
The output json format should be {'reasoning_and_reflection':str, 'language_plan':str, 'executable_plan':List[{'action_id':int, 'action_name':str}...]}
The fields in above JSON follows the purpose below:
1. reasoning_and_reflection is for summarizing the history of interactions and any available environmental feedback. Additionally, provide reasoning as to why the last action or plan failed and did not finish the task,
2. language_plan is for describing a list of actions to achieve the user instruction. Each action is started by the step number and the action name,
3. executable_plan is a list of actions needed to achieve the user instruction, with each action having an action ID and a name.
4. keep your plan efficient and concise.
!!! When generating content for JSON strings, avoid using any contractions or abbreviated forms (like 's, 're, 've, 'll, 'd, n't) that use apostrophes. Instead, write out full forms (e.g., is, are, have, will, would, not) to prevent parsing errors in JSON. Please do not output any other thing more than the above-mentioned JSON, do not include ```json and ```!!!.
";

/// Replaces the `{}` placeholders of `template` with `args` in order.
///
/// Placeholders without a corresponding argument are left untouched, extra
/// arguments are ignored.
pub fn fill_placeholders(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(arg) => out.push_str(arg),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// Renders the prompt of a planning step.
#[derive(Clone, Debug)]
pub struct PromptBuilder {
    system_prompt: String,
    actions: Vec<String>,
    examples: Vec<String>,
    language_only: bool,
}

impl PromptBuilder {
    /// Constructs a prompt builder.
    ///
    /// Only the first `n_shot` of `examples` are used.
    pub fn new(
        system_prompt: impl Into<String>,
        actions: Vec<String>,
        examples: &[String],
        n_shot: usize,
        language_only: bool,
    ) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            actions,
            examples: examples.iter().take(n_shot).cloned().collect(),
            language_only,
        }
    }

    /// The actions as `\naction id i: name`, joined by `, `.
    pub fn action_list(&self) -> String {
        self.actions
            .iter()
            .enumerate()
            .map(|(i, name)| format!("\naction id {}: {}", i, name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn examples_block(&self) -> String {
        self.examples
            .iter()
            .enumerate()
            .map(|(i, x)| format!("## Task Execution Example {}: \n {}", i, x))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn action_name(&self, ix: usize) -> &str {
        self.actions.get(ix).map_or("unknown", |s| s.as_str())
    }

    /// Renders the prompt for `instruction` given the feedback collected in the
    /// current episode.
    pub fn build(&self, instruction: &str, feedback: &[Feedback]) -> String {
        let instruction = instruction.trim_end_matches('.');
        let max_id = self.actions.len().saturating_sub(1).to_string();
        let mut prompt = fill_placeholders(
            &self.system_prompt,
            &[&max_id, &self.action_list(), &self.examples_block()],
        );

        if feedback.is_empty() {
            prompt.push_str(&format!(
                "\n\n## Now the human instruction is: {}.",
                instruction
            ));
        } else {
            prompt.push_str(&format!("\n\n## The human instruction is: {}.", instruction));
            prompt.push_str("\n\n The action history:");
            for (i, f) in feedback.iter().enumerate() {
                prompt.push_str(&format!(
                    "\n Step {}, action id {}, {}, env feedback: {}",
                    i,
                    f.action_id,
                    self.action_name(f.action_id),
                    f.env_feedback
                ));
            }
        }

        prompt.push_str("\nYou are supposed to output in JSON.");
        prompt.push_str(if self.language_only {
            OUTPUT_TEMPLATE_LANG
        } else {
            OUTPUT_TEMPLATE
        });
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> Vec<String> {
        vec!["Stop".into(), "Forward".into(), "Pickup".into()]
    }

    #[test]
    fn test_fill_placeholders() {
        assert_eq!(fill_placeholders("a {} b {} c", &["1", "2"]), "a 1 b 2 c");
        assert_eq!(fill_placeholders("a {} b {}", &["1"]), "a 1 b {}");
        assert_eq!(fill_placeholders("none", &["1"]), "none");
        // Arguments holding braces are not expanded again.
        assert_eq!(fill_placeholders("{}{}", &["{}", "x"]), "{}x");
    }

    #[test]
    fn test_action_list() {
        let builder = PromptBuilder::new("{}", actions(), &[], 0, false);
        assert_eq!(
            builder.action_list(),
            "\naction id 0: Stop, \naction id 1: Forward, \naction id 2: Pickup"
        );
    }

    #[test]
    fn test_first_prompt() {
        let builder = PromptBuilder::new("max {} | {} | [{}]", actions(), &[], 0, false);
        let prompt = builder.build("Make coffee.", &[]);
        assert!(prompt.starts_with("max 2 | \naction id 0: Stop"));
        assert!(prompt.contains("| []"));
        assert!(prompt.contains("\n\n## Now the human instruction is: Make coffee."));
        assert!(!prompt.contains("Make coffee.."));
        assert!(prompt.contains("\nYou are supposed to output in JSON."));
        assert!(prompt.ends_with(OUTPUT_TEMPLATE));
    }

    #[test]
    fn test_prompt_with_history() {
        let builder = PromptBuilder::new("{} {} {}", actions(), &[], 0, true);
        let feedback = vec![
            Feedback {
                action_id: 1,
                env_feedback: "Last action executed successfully.".into(),
            },
            Feedback {
                action_id: 2,
                env_feedback: "Last action failed.".into(),
            },
        ];
        let prompt = builder.build("Make coffee", &feedback);
        assert!(prompt.contains("\n\n## The human instruction is: Make coffee."));
        assert!(prompt.contains("\n\n The action history:"));
        assert!(prompt.contains(
            "\n Step 0, action id 1, Forward, env feedback: Last action executed successfully."
        ));
        assert!(prompt.contains("\n Step 1, action id 2, Pickup, env feedback: Last action failed."));
        assert!(!prompt.contains("Now the human instruction"));
        assert!(prompt.ends_with(OUTPUT_TEMPLATE_LANG));
    }

    #[test]
    fn test_examples_limited_by_n_shot() {
        let examples = vec!["ex a".to_string(), "ex b".to_string(), "ex c".to_string()];
        let builder = PromptBuilder::new("{} {} {}", actions(), &examples, 2, false);
        let prompt = builder.build("go", &[]);
        assert!(prompt.contains("## Task Execution Example 0: \n ex a\n\n## Task Execution Example 1: \n ex b"));
        assert!(!prompt.contains("ex c"));
    }

    #[test]
    fn test_teach_system_prompt_has_three_slots() {
        assert_eq!(TEACH_SYSTEM_PROMPT.matches("{}").count(), 3);
    }
}
