//! Canned coaching feedback standing in for a generative model.
//!
//! Vertical jump and sit-up results get tier-specific advice; every other
//! test receives one generic template naming the test.

use crate::config::CoachConfig;
use crate::provider::{coaching_prompt, CoachError, CoachProvider, CoachResult};
use crate::types::{JumpResult, RepResult, TestResult, TestType};
use async_trait::async_trait;
use tracing::{debug, info};

pub struct MockCoach {
    config: CoachConfig,
}

impl MockCoach {
    pub fn new(config: CoachConfig) -> CoachResult<Self> {
        config
            .validate()
            .map_err(|message| CoachError::InvalidConfig { message })?;
        Ok(Self { config })
    }

    pub fn with_default_config() -> CoachResult<Self> {
        Self::new(CoachConfig::default())
    }

    pub fn config(&self) -> &CoachConfig {
        &self.config
    }
}

#[async_trait]
impl CoachProvider for MockCoach {
    async fn coaching_feedback(&self, result: &TestResult) -> CoachResult<String> {
        info!("Generating coaching feedback for {}", result.test_type());
        debug!("Simulated prompt: {}", coaching_prompt(result)?);

        tokio::time::sleep(self.config.response_delay).await;

        Ok(match result {
            TestResult::VerticalJump(jump) => jump_feedback(jump),
            TestResult::SitUps(reps) => situp_feedback(reps),
            other => generic_feedback(other.test_type()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

fn jump_feedback(result: &JumpResult) -> String {
    let height = result.height;
    if height > 45.0 {
        return format!(
            "### Strengths
Excellent! A jump of {height:.1} cm indicates powerful explosive strength in your lower body. This is a fantastic foundation for sports requiring quick, powerful movements.

### Areas for Improvement
To reach the next level, focus on refining your jumping mechanics. Ensure you are using your arms effectively for momentum and that your landing is controlled to absorb impact safely.

### Recommended Drills
1. **Box Jumps**: Perform 3 sets of 5 reps. Focus on exploding up and landing softly.
2. **Depth Jumps**: Step off a small box and immediately explode into a vertical jump upon landing. This improves reactive strength.
3. **Kettlebell Swings**: Develops hip power which is crucial for maximizing jump height."
        );
    }
    if height > 30.0 {
        return format!(
            "### Strengths
A solid performance! Your jump of {height:.1} cm shows good foundational power. You have a great base to build upon.

### Areas for Improvement
Focus on increasing your rate of force development. This means training your muscles to produce maximum force in the shortest amount of time. Also, work on your pre-jump countermovement.

### Recommended Drills
1. **Squat Jumps**: 3 sets of 8 reps. Focus on minimizing ground contact time.
2. **Pogo Hops**: Improves ankle stiffness and elasticity. 3 sets of 20 seconds.
3. **Barbell Squats**: Building overall leg strength is key. Focus on a full range of motion."
        );
    }
    format!(
        "### Strengths
Good effort on your jump of {height:.1} cm. Every test is a baseline to improve from, and you've established yours.

### Areas for Improvement
The primary focus should be on building foundational strength in your legs and core. Proper form is also critical to prevent injury and maximize output.

### Recommended Drills
1. **Bodyweight Squats**: Master the form first. 3 sets of 15 reps.
2. **Glute Bridges**: Activates and strengthens your glutes, which are key for jumping. 3 sets of 12 reps.
3. **Plank**: A strong core is essential for transferring energy. Hold for 3 sets of 30-60 seconds."
    )
}

fn situp_feedback(result: &RepResult) -> String {
    let RepResult { count, deviations } = *result;

    let mut feedback = if count > 40 {
        format!(
            "### Strengths
Fantastic endurance! A score of {count} reps shows a very strong and resilient core, which is vital for almost every athletic movement.

### Areas for Improvement
With such high endurance, you can now focus on functional core strength. This involves training your core to resist rotation and stabilize your spine under load.
"
        )
    } else if count > 20 {
        format!(
            "### Strengths
Great work! Achieving {count} reps is a solid display of core strength and endurance. You have a strong muscular base to build on.

### Areas for Improvement
Focus on consistency in your reps. Aim to make the last rep as clean as the first. Also, consider incorporating exercises that target the lower abs and obliques for balanced strength.
"
        )
    } else {
        format!(
            "### Strengths
Good job completing the test! {count} reps is a solid starting point. You've established a baseline and now you know what to work on.

### Areas for Improvement
The main goal is to build muscular endurance in your abdominals and hip flexors. Focus on performing each rep with controlled, correct form rather than rushing.
"
        )
    };

    if deviations > 0 {
        feedback.push_str(&format!(
            "
### Form Correction ({deviations} deviations noted)
The AI noted that {deviations} of your reps did not meet the full range-of-motion criteria. To improve, ensure your back fully touches the ground on the way down and your chest comes all the way up. Slower, more controlled reps are better than fast, incomplete ones.
"
        ));
    }

    feedback.push_str(
        "
### Recommended Drills
1. **Plank Series**: Include front and side planks to build isometric strength.
2. **Leg Raises**: Excellent for targeting the lower abdominal muscles.
3. **Russian Twists**: Improves rotational strength and oblique engagement.",
    );

    feedback
}

fn generic_feedback(test_type: TestType) -> String {
    format!(
        "### Overall Performance
Well done on completing the {test_type} test. Consistent effort and dedication are key to improvement.

### Areas for Improvement
To improve your performance, focus on the fundamental techniques specific to this exercise. Building supporting muscle groups will also contribute to better results.

### Recommended Drills
1. **Technique Practice**: Spend time performing the movement slowly to perfect your form.
2. **Strength Training**: Incorporate resistance training for the primary muscles used in this test.
3. **Mobility Work**: Ensure you have the necessary range of motion to perform the exercise correctly and safely."
    )
}
