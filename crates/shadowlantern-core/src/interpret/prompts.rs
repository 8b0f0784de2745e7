//! Instruction text sent to the text-generation service.

use indoc::{formatdoc, indoc};

use crate::diagnosis::{LogMessage, PhaseResponses, Speaker, SENTENCE_CATEGORIES};
use crate::values::VALUE_CARDS;

const PROSECUTOR_PERSONA: &str = indoc! {"
    You are Wraith, the prosecutor of the shadow court.
    You interrogate the defendant about their shadow (the desires, anger and fears
    they would rather not admit) and bring their real values to light.

    Rules:
    - Follow the current phase (envy, then rage, then loss).
    - Read the hidden psychology behind each answer.
    - Call out contradictions with \"Objection!\".
    - Show understanding, but never coddle.
    - Do not accept surface-level answers or agree with self-justification.
    - Ask one short, sharp question of at most 200 characters.
    - Name candidate values when you see them.
"};

fn phase_focus(phase: &str) -> &'static str {
    match phase {
        "rage" => indoc! {"
            Current phase: RAGE.
            Dig into what the defendant finds unforgivable. The trigger reveals the rule
            they must protect, their core value.
        "},
        "loss" => indoc! {"
            Current phase: LOSS.
            Ask what they would refuse to give up when everything else is gone. The fear
            of loss reveals the root of their identity.
        "},
        _ => indoc! {"
            Current phase: ENVY.
            Dig into whose what the defendant envies. The object of envy reveals what they
            truly want, a hidden value.
        "},
    }
}

/// Next interrogation question given the conversation so far.
pub fn next_question(phase: &str, log: &[LogMessage]) -> String {
    let transcript = log
        .iter()
        .map(|m| {
            let who = match m.speaker {
                Speaker::System => "Wraith",
                Speaker::User => "Defendant",
            };
            format!("{who}: {}", m.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    formatdoc! {"
        {PROSECUTOR_PERSONA}
        {focus}
        Interrogation record so far:
        {transcript}

        Based on the record, ask the next question in Wraith's voice. Reply with the
        question only, in English, within 200 characters.
        ",
        focus = phase_focus(phase),
    }
}

fn value_list() -> String {
    VALUE_CARDS
        .iter()
        .map(|v| format!("- {}: {} ({})", v.id, v.name, v.description))
        .collect::<Vec<_>>()
        .join("\n")
}

fn numbered(responses: &[String]) -> String {
    responses
        .iter()
        .enumerate()
        .map(|(i, r)| format!("Q{}: {r}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Value analysis of the shadow interrogation.
pub fn shadow_analysis(responses: &[PhaseResponses]) -> String {
    let testimony = responses
        .iter()
        .map(|p| format!("## {} phase\n{}", p.label, numbered(&p.responses)))
        .collect::<Vec<_>>()
        .join("\n\n");

    formatdoc! {r#"
        You are an expert in psychological analysis. From the defendant's testimony in
        the shadow court (answers about envy, rage and loss), identify their core values.

        Value list:
        {values}

        Analysis rules:
        1. Envy testimony shows what they truly crave.
        2. Rage testimony shows the rule they must protect.
        3. Loss testimony shows the foundation of their identity.

        Reply with JSON only, using ids from the list:
        {{
          "values": [
            {{
              "id": "V001", "name": "value name", "source": "envy",
              "confidence": 85, "evidence": "summary of the testimony"
            }}
          ],
          "analysis": {{
            "hiddenDesire": "ambition hidden in the envy",
            "coreRule": "non-negotiable justice behind the rage",
            "identity": "foundation of self behind the loss"
          }},
          "summary": "overall analysis within 100 words"
        }}

        Testimony:
        {testimony}
        "#,
        values = value_list(),
    }
}

/// Value analysis of completed sentences, grouped by category.
pub fn sentence_analysis(responses: &[PhaseResponses]) -> String {
    let categories = SENTENCE_CATEGORIES
        .iter()
        .map(|(id, label, _)| format!("- {id}: {label}"))
        .collect::<Vec<_>>()
        .join("\n");

    let answers = responses
        .iter()
        .map(|p| {
            let stems = SENTENCE_CATEGORIES
                .iter()
                .find(|(id, _, _)| *id == p.phase)
                .map(|(_, _, stems)| *stems)
                .unwrap_or(&[]);
            let lines = p
                .responses
                .iter()
                .enumerate()
                .map(|(i, answer)| match stems.get(i) {
                    Some(stem) => format!("  {}. {}", i + 1, stem.replace("___", answer)),
                    None => format!("  {}. {answer}", i + 1),
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("## {}\n{lines}", p.label)
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    formatdoc! {r#"
        You are an expert in psychological analysis. From the user's completed
        sentences, identify their core values.

        Categories:
        {categories}

        Value list:
        {values}

        Analysis rules:
        1. For each category, identify the values the user emphasizes in that area.
        2. Judge confidence from word choice and intensity.
        3. The value that appears most often or most strongly is the primaryValue.

        Reply with JSON only, using ids from the list:
        {{
          "categories": [
            {{
              "categoryId": "money",
              "categoryName": "Money",
              "values": [
                {{
                  "id": "V035", "name": "Financial security",
                  "confidence": 80, "evidence": "reason"
                }}
              ]
            }}
          ],
          "primaryValue": {{ "id": "V001", "name": "value name", "confidence": 85 }},
          "summary": "overall analysis within 100 words"
        }}

        Completed sentences:
        {answers}
        "#,
        values = value_list(),
    }
}

const THEME_CATEGORIES: [(&str, &str); 8] = [
    ("Autonomy", "freedom, independence, being yourself, control"),
    ("Achievement", "success, goals, winning, challenge"),
    ("Connection", "relationships, cooperation, empathy, team"),
    ("Creativity", "creation, art, expression, originality"),
    ("Service", "contribution, helping, society, support"),
    ("Security", "stability, safety, assurance, continuity"),
    ("Knowledge", "learning, knowledge, growth, understanding"),
    ("Adventure", "adventure, change, novelty, stimulation"),
];

/// Life-theme analysis of the career construction interview.
pub fn cci_analysis(responses: &[PhaseResponses]) -> String {
    let answers = responses
        .iter()
        .map(|p| format!("[{}]\n{}", p.label, p.responses.join("\n")))
        .collect::<Vec<_>>()
        .join("\n\n");
    let themes = THEME_CATEGORIES
        .iter()
        .map(|(name, keywords)| format!("{name}: {keywords}"))
        .collect::<Vec<_>>()
        .join("\n");

    formatdoc! {r#"
        You are a career counselor versed in Savickas' career construction theory.

        From the user's answers, find:
        1. Recurring themes: patterns, values and needs that repeat across answers.
        2. Life narrative: the user's life story in one or two sentences.
        3. Core values: the three to five most important values.
        4. Career advice: what kind of work or activity would satisfy this person.

        Hints:
        - Role models project who the user wants to become.
        - Favorite media and stories hide the problem they want to solve.
        - A motto shows what matters most in life.
        - Early recollections hold the archetypal life theme.
        - Favorite subjects and hobbies reflect the authentic self.

        User answers:
        {answers}

        Theme categories for reference:
        {themes}

        Reply with JSON only:
        {{
          "themes": [
            {{
              "id": "theme id", "name": "theme name",
              "description": "why it matters", "frequency": 3
            }}
          ],
          "lifeNarrative": "one or two sentence life story",
          "coreValues": ["value 1", "value 2", "value 3"],
          "careerAdvice": "two or three sentences"
        }}
        "#,
    }
}

/// If-then plan for an obstacle standing in the way of today's goal.
pub fn obstacle_plan(goal: &str, obstacle: &str, value_context: Option<&str>) -> String {
    let values = value_context
        .map(|v| format!("User's values: {v}\n"))
        .unwrap_or_default();

    formatdoc! {r#"
        You are a habit-formation coach helping the user stick to their goal.

        User's goal: {goal}
        Obstacle: {obstacle}
        {values}
        Reply with JSON only:
        {{
          "ifThenPlan": "a concrete plan in the form 'If X, then I will Y'",
          "suggestions": [
            "an even easier version of the goal",
            "another easier version",
            "an environment change that removes the obstacle"
          ]
        }}

        Key points:
        1. The if-then plan uses a trigger that comes before the obstacle.
        2. Suggestions should feel almost too easy.
        3. Prefer environment and systems over willpower.
        4. Give concrete, actionable advice rather than encouragement.
        "#,
    }
}
