use anyhow::{anyhow, Result};
use framepipe::core::Frame;
use framepipe::engine::{
    ExecutionConfig, Pipeline, PipelineRunner, PipelineTask, ProcessorRegistry,
};
use framepipe::processors::{ContextAggregator, LlmContext, Role};
use framepipe::transport::{
    LocalTransport, TransportEvent, ON_FIRST_PARTICIPANT_JOINED, ON_PARTICIPANT_LEFT,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    framepipe::logging::init("info");

    println!("framepipe - local session demo");
    println!("==============================\n");

    let transport = Arc::new(LocalTransport::new("Local"));
    let context = Arc::new(Mutex::new(LlmContext::with_system_prompt(
        "You are a helpful assistant. Keep answers short.",
    )));

    // Session-bound processors share state with this function, so they are
    // registered as closures next to the built-ins
    let mut registry = ProcessorRegistry::with_builtins();
    {
        let context = context.clone();
        registry.register("user_context", move || {
            Box::new(ContextAggregator::new(context.clone(), Role::User))
        });
    }
    {
        let context = context.clone();
        registry.register("assistant_context", move || {
            Box::new(ContextAggregator::new(context.clone(), Role::Assistant))
        });
    }
    {
        let transport = transport.clone();
        registry.register("transport_output", move || Box::new(transport.output()));
    }

    // user context -> "bot" -> assistant context -> gain -> transport output -> sink
    let pipeline = Pipeline::from_json(
        json!({
            "processors": [
                {"type": "user_context"},
                {"type": "text_transform", "config": {"mode": "uppercase"}},
                {"type": "assistant_context"},
                {"type": "audio_gain", "config": {"gain_db": -6.0}},
                {"type": "transport_output"},
                {"type": "kind_filter", "config": {"drop": ["audio", "text", "control"]}}
            ]
        }),
        &registry,
    )
    .await?;
    println!("Pipeline: {:?}\n", pipeline);

    let config = ExecutionConfig::default()
        .with_metrics(true)
        .with_interruptions(true);
    let task = PipelineTask::new(pipeline, config);
    let sender = task.sender();

    {
        let sender = sender.clone();
        let context = context.clone();
        transport.on(ON_FIRST_PARTICIPANT_JOINED, move |_| {
            let frame = context
                .lock()
                .map_err(|_| anyhow!("context lock poisoned"))?
                .to_frame();
            sender.enqueue_one(frame)?;
            Ok(())
        });
    }
    {
        let sender = sender.clone();
        transport.on(ON_PARTICIPANT_LEFT, move |_| {
            sender.enqueue_one(Frame::end())?;
            Ok(())
        });
    }

    let mut output = transport
        .take_output()
        .ok_or_else(|| anyhow!("transport output already taken"))?;

    let runner = Arc::new(PipelineRunner::new());
    let run = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run(task).await })
    };

    let input = transport.input(sender);
    transport.emit(TransportEvent::FirstParticipantJoined {
        participant: "guest".to_string(),
    });
    for line in ["hello there", "what can you do?", "thanks"] {
        input.push_text(line)?;
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let silence: Vec<u8> = [1000i16, -1000, 2000, -2000]
        .iter()
        .flat_map(|s| s.to_le_bytes())
        .collect();
    input.push_audio(silence, 16_000, 1)?;
    tokio::time::sleep(Duration::from_millis(20)).await;

    transport.emit(TransportEvent::ParticipantLeft {
        participant: "guest".to_string(),
        reason: "hangup".to_string(),
    });

    let outcome = run.await?;
    println!("\nRun finished: {:?}", outcome);
    println!("Runner state: {}", runner.state().name());

    println!("\nFrames delivered to the transport:");
    while let Ok(frame) = output.try_recv() {
        println!("  {}", frame);
    }

    let context = context
        .lock()
        .map_err(|_| anyhow!("context lock poisoned"))?
        .clone();
    println!("\nConversation context ({} messages):", context.messages.len());
    for message in &context.messages {
        println!("  {:?}: {}", message.role, message.content);
    }

    if let Some(monitor) = runner.monitor() {
        println!("\n{}", monitor.generate_report());
    }

    Ok(())
}
