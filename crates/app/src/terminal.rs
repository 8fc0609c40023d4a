//! Line-oriented driver: a simulated player ticking in real time, commands on stdin.

use std::error::Error;
use std::time::Duration;

use quiz_core::model::Notice;
use services::{
    NextStep, PlaybackController, QuizEngine, QuizError, QuizEvent, QuizPhase, ResumeOutcome,
    ReviewItem, SimulatedPlayer, SubmitOutcome,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{MissedTickBehavior, interval};

const TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

type Engine = QuizEngine<SimulatedPlayer>;

pub async fn run(mut engine: Engine) -> Result<(), Box<dyn Error>> {
    match engine.resume().await? {
        ResumeOutcome::Completed(items) => {
            print_review(&items, engine.state().score());
            return Ok(());
        }
        ResumeOutcome::Resumed { cursor, seek_to } => {
            println!("Resuming at question {} from {seek_to}s.", cursor + 1);
        }
        ResumeOutcome::Fresh => {
            println!("{} questions in this video.", engine.state().total_questions());
        }
    }
    print_help();
    engine.start();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let flow = tokio::select! {
            _ = ticker.tick() => tick(&mut engine),
            line = lines.next_line() => match line? {
                Some(line) => command(&mut engine, line.trim()).await?,
                None => Flow::Stop,
            },
        };
        if flow == Flow::Stop {
            break;
        }
    }
    Ok(())
}

fn tick(engine: &mut Engine) -> Flow {
    engine.player_mut().advance(TICK.as_secs_f64());
    let mut events = Vec::new();
    for event in engine.player_mut().drain_events() {
        events.extend(engine.handle_player_event(event));
    }
    events.extend(engine.advance(TICK));

    let mut flow = Flow::Continue;
    for event in events {
        if render(engine, event) == Flow::Stop {
            flow = Flow::Stop;
        }
    }
    flow
}

fn render(engine: &Engine, event: QuizEvent) -> Flow {
    match event {
        QuizEvent::QuestionActivated {
            index,
            question,
            answers,
        } => {
            println!();
            println!(
                "Question {}/{} ({}% done)",
                index + 1,
                engine.state().total_questions(),
                engine.progress_percent()
            );
            println!("{question}");
            for (pos, answer) in answers.iter().enumerate() {
                println!("  {}) {}", pos + 1, answer.text);
            }
        }
        QuizEvent::CountdownTick { remaining_secs } => {
            if remaining_secs % 10 == 0 || remaining_secs <= 5 {
                println!("  {remaining_secs}s left");
            }
        }
        QuizEvent::TimeUp { hint } => {
            println!("{}", Notice::TimeUp.fallback_text());
            match hint {
                Some(hint) => println!("Hint: {hint}"),
                None => println!("{}", Notice::NoMoreHints.fallback_text()),
            }
        }
        QuizEvent::ReviewReady(items) => {
            print_review(&items, engine.state().score());
            return Flow::Stop;
        }
        QuizEvent::PlayerFailed(kind) => {
            eprintln!("{}", kind.message());
            return Flow::Stop;
        }
    }
    Flow::Continue
}

async fn command(engine: &mut Engine, input: &str) -> Result<Flow, Box<dyn Error>> {
    match input {
        "q" => return Ok(Flow::Stop),
        "r" => {
            engine.reset().await?;
            println!("Progress cleared, starting over.");
        }
        "p" if engine.phase() == QuizPhase::Watching => {
            let player = engine.player_mut();
            if player.is_playing() {
                player.pause();
            } else {
                player.play();
            }
        }
        "h" => match engine.show_hint() {
            Some(hint) => println!("Hint: {hint}"),
            None if engine.is_question_active() => println!("{}", Notice::NoMoreHints.fallback_text()),
            None => {}
        },
        "s" => return submit(engine).await,
        _ => match input.parse::<usize>() {
            Ok(choice) => select(engine, choice),
            Err(_) => print_help(),
        },
    }
    Ok(Flow::Continue)
}

fn select(engine: &mut Engine, choice: usize) {
    let Some(answer) = engine
        .active_question()
        .and_then(|ctx| ctx.displayed_answers().get(choice.wrapping_sub(1)))
        .cloned()
    else {
        println!("No such answer.");
        return;
    };
    match engine.select_answer(answer.original_index) {
        Ok(()) => println!("Selected: {}", answer.text),
        Err(err) => println!("{err}"),
    }
}

async fn submit(engine: &mut Engine) -> Result<Flow, Box<dyn Error>> {
    let outcome = match engine.submit().await {
        Ok(outcome) => outcome,
        Err(QuizError::NoActiveQuestion) => {
            println!("No question is showing.");
            return Ok(Flow::Continue);
        }
        Err(err) => return Err(err.into()),
    };

    match outcome {
        SubmitOutcome::NoAnswerSelected => {
            println!("{}", Notice::SelectAnswerPrompt.fallback_text());
            Ok(Flow::Continue)
        }
        SubmitOutcome::Resolved {
            record,
            points,
            score,
            next,
        } => {
            if record.is_correct {
                println!("{} +{points} (score {score})", Notice::CorrectFeedback.fallback_text());
            } else {
                println!(
                    "{} The answer was: {}",
                    Notice::IncorrectFeedback.fallback_text(),
                    record.correct_answer_text
                );
            }
            match next {
                NextStep::Resume => Ok(Flow::Continue),
                NextStep::Review(items) => {
                    print_review(&items, score);
                    Ok(Flow::Stop)
                }
            }
        }
    }
}

fn print_review(items: &[ReviewItem], score: i64) {
    println!();
    println!("=== Review ===");
    for item in items {
        match item {
            ReviewItem::NoAnswers { total_questions } => {
                println!("{} ({total_questions} questions)", item.notice().fallback_text());
            }
            ReviewItem::Answered {
                number,
                question,
                user_answer,
                correct_answer,
                is_correct,
            } => {
                println!("{number}. {question}");
                println!("   your answer: {user_answer} ({})", item.notice().fallback_text());
                if !is_correct {
                    println!("   correct answer: {correct_answer}");
                }
            }
        }
    }
    println!("Score: {score}");
}

fn print_help() {
    println!("Commands: 1-4 select, s submit, h hint, p pause/play, r restart, q quit");
}
