mod common;

use orion_ai_host::interface::Order;
use orion_ai_host::scripting::{AiController, Interpreter, LifecycleState, TurnOutcome};

#[test]
fn test_reference_ai_plays_turns() -> anyhow::Result<()> {
    let _guard = common::lock();
    let client = common::client()?;
    let mut controller = AiController::try_new(
        common::config_for(&common::reference_ai_dir()),
        common::interface(&client),
    )?;
    assert_eq!(controller.state(), LifecycleState::Ready);

    assert_eq!(controller.generate_orders(), TurnOutcome::Completed);
    {
        let client = client.borrow();
        assert_eq!(client.done_turn_count(), 1);
        assert_eq!(
            client.orders(),
            [Order::FleetMove {
                fleet_id: 30,
                destination_id: 3
            }]
        );
        assert!(client.log_lines()[0].starts_with("AI initialized for AI_1"));
    }

    client.borrow_mut().advance_turn();
    assert_eq!(controller.generate_orders(), TurnOutcome::Completed);
    assert_eq!(client.borrow().done_turn_count(), 1);

    controller.shutdown();
    assert!(!Interpreter::is_live());
    Ok(())
}

#[test]
fn test_absent_module_falls_back() -> anyhow::Result<()> {
    let _guard = common::lock();
    let dir = tempfile::TempDir::new()?;
    let client = common::client()?;
    let mut controller =
        AiController::new(common::config_for(dir.path()), common::interface(&client));

    let report = controller.startup_report();
    assert!(report.interpreter && report.namespace);
    assert!(!report.module && !report.initialized);
    assert!(!report.is_functional());

    assert_eq!(controller.generate_orders(), TurnOutcome::FallbackSignalled);
    assert_eq!(client.borrow().done_turn_count(), 1);
    assert!(client.borrow().orders().is_empty());
    Ok(())
}

#[test]
fn test_failing_turn_entry_signals_once() -> anyhow::Result<()> {
    let _guard = common::lock();
    let dir = common::ai_dir_with(
        "exports.InitFreeOrionAI = function () {};\n\
         exports.GenerateOrders = function () { undefinedFunction(); };",
    )?;
    let client = common::client()?;
    let mut controller = AiController::try_new(common::config_for(dir.path()), common::interface(&client))?;

    for _ in 0..3 {
        assert_eq!(controller.generate_orders(), TurnOutcome::FallbackSignalled);
        assert_eq!(client.borrow().done_turn_count(), 1);
        client.borrow_mut().advance_turn();
    }
    Ok(())
}

#[test]
fn test_duplicate_done_turn_is_ignored() -> anyhow::Result<()> {
    let _guard = common::lock();
    let dir = common::ai_dir_with(
        "var fo = require('FreeOrionAIInterface');\n\
         exports.InitFreeOrionAI = function () {};\n\
         exports.GenerateOrders = function () { fo.DoneTurn(); fo.DoneTurn(); };",
    )?;
    let client = common::client()?;
    let mut controller = AiController::try_new(common::config_for(dir.path()), common::interface(&client))?;

    assert_eq!(controller.generate_orders(), TurnOutcome::Completed);
    assert_eq!(client.borrow().done_turn_count(), 1);
    Ok(())
}

#[test]
fn test_init_failure_is_not_fatal() -> anyhow::Result<()> {
    let _guard = common::lock();
    let dir = common::ai_dir_with(
        "var fo = require('FreeOrionAIInterface');\n\
         exports.InitFreeOrionAI = function () { throw new Error('bad init'); };\n\
         exports.GenerateOrders = function () { fo.DoneTurn(); };",
    )?;
    let client = common::client()?;
    let mut controller = AiController::new(common::config_for(dir.path()), common::interface(&client));

    let report = controller.startup_report();
    assert!(report.module);
    assert!(!report.initialized);
    assert!(report.errors.iter().any(|e| e.contains("bad init")));

    // 模块已加载，回合入口照常调用
    assert_eq!(controller.generate_orders(), TurnOutcome::Completed);
    assert_eq!(client.borrow().done_turn_count(), 1);
    Ok(())
}

#[test]
fn test_shutdown_after_degraded_startup() -> anyhow::Result<()> {
    let _guard = common::lock();
    let dir = tempfile::TempDir::new()?;
    let client = common::client()?;

    let controller = AiController::new(
        common::config_for(&dir.path().join("missing")),
        common::interface(&client),
    );
    assert!(controller.startup_report().search_path.is_empty());
    controller.shutdown();
    assert!(!Interpreter::is_live());

    // 停止后可以重新启动
    let controller = AiController::try_new(
        common::config_for(&common::reference_ai_dir()),
        common::interface(&client),
    )?;
    assert!(Interpreter::is_live());
    drop(controller);
    assert!(!Interpreter::is_live());
    Ok(())
}

#[test]
fn test_chat_message_is_inert() -> anyhow::Result<()> {
    let _guard = common::lock();
    let client = common::client()?;
    let mut controller = AiController::try_new(
        common::config_for(&common::reference_ai_dir()),
        common::interface(&client),
    )?;
    let before = client.borrow().log_lines().len();
    controller.handle_chat_message(2, "hello");
    assert_eq!(client.borrow().log_lines().len(), before);
    assert!(client.borrow().outbox().is_empty());
    Ok(())
}

#[test]
fn test_extra_search_paths() -> anyhow::Result<()> {
    let _guard = common::lock();
    let main = common::ai_dir_with(
        "var helper = require('helper');\n\
         exports.InitFreeOrionAI = function () {};\n\
         exports.GenerateOrders = function () { FreeOrionAIInterface.LogOutput(helper.greeting); FreeOrionAIInterface.DoneTurn(); };",
    )?;
    let shared = tempfile::TempDir::new()?;
    std::fs::create_dir(shared.path().join("helper"))?;
    std::fs::write(
        shared.path().join("helper").join("index.js"),
        "exports.greeting = 'from helper';",
    )?;

    let mut config = common::config_for(main.path());
    config.extra_search_paths = vec![shared.path().to_path_buf(), main.path().join("nope")];
    let client = common::client()?;
    let mut controller = AiController::try_new(config, common::interface(&client))?;

    assert_eq!(controller.startup_report().search_path.len(), 2);
    assert_eq!(controller.generate_orders(), TurnOutcome::Completed);
    assert_eq!(client.borrow().log_lines(), ["from helper".to_string()]);
    Ok(())
}
