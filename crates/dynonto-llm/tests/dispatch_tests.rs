//! Dispatcher flows against a scripted collaborator.

use dynonto_llm::{
    CollaboratorError, ExtractionStrategy, GenerationOptions, MockCollaborator,
    OperationDispatcher, OperationError, OperationKind, OperationRequest, RawOperationRequest,
};
use dynonto_model::{samples, Ontology, Relation};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn dispatcher_with(mock: MockCollaborator) -> (OperationDispatcher, Arc<MockCollaborator>) {
    let mock = Arc::new(mock);
    (OperationDispatcher::new(mock.clone()), mock)
}

fn merge_request() -> OperationRequest {
    OperationRequest::new(OperationKind::Merge, samples::person(), samples::factory())
}

// ============================================================================
// Happy paths
// ============================================================================

#[tokio::test]
async fn merge_response_passes_through_unchanged() {
    let response = json!({
        "result": {"id": "merged", "name": "Merged", "classes": [], "relations": [], "axioms": [], "instances": []},
        "alignments": [{"sourceA": "Person", "sourceB": "Human", "confidence": 0.9, "reasoning": "same"}],
        "conflicts": [],
        "metadata": {"operation": "merge", "alignmentCount": 1, "conflictCount": 0}
    });
    let (dispatcher, mock) = dispatcher_with(MockCollaborator::always(&response.to_string()));

    let outcome = dispatcher.dispatch(&merge_request()).await.unwrap();

    assert_eq!(outcome.payload, response);
    assert!(outcome.validation.is_none());
    assert!(outcome.contract_gaps.is_empty());
    assert!(!outcome.offline);
    assert_eq!(outcome.strategy, ExtractionStrategy::WholeDocument);

    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("# Task: Ontology Merge"));
}

#[tokio::test]
async fn fenced_response_is_recovered() {
    let text = "Here you go:\n```json\n{\"result\": {\"id\": \"c\", \"name\": \"C\"}, \"interface\": {\"connections\": []}, \"metadata\": {\"connectionCount\": 0}}\n```";
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always(text));
    let request =
        OperationRequest::new(OperationKind::Composition, samples::factory(), samples::ghg());

    let outcome = dispatcher.dispatch(&request).await.unwrap();
    assert_eq!(outcome.strategy, ExtractionStrategy::FencedBlock);
    assert_eq!(outcome.result().unwrap()["id"], "c");
    assert!(outcome.contract_gaps.is_empty());
}

#[tokio::test]
async fn same_request_renders_same_digest() {
    let (dispatcher, mock) = dispatcher_with(MockCollaborator::always("{\"result\": null}"));
    let first = dispatcher.dispatch(&merge_request()).await.unwrap();
    let second = dispatcher.dispatch(&merge_request()).await.unwrap();
    assert_eq!(first.digest, second.digest);
    let prompts = mock.prompts();
    assert_eq!(prompts[0], prompts[1]);
}

// ============================================================================
// Validation diagnostics
// ============================================================================

#[tokio::test]
async fn invalid_result_gets_diagnostic_attached() {
    let response = json!({
        "result": {
            "id": "broken",
            "name": "Broken",
            "classes": [{"id": "Person", "name": "Person"}],
            "relations": [{"id": "worksFor", "name": "works for", "domain": "Person", "range": "Company", "type": "object"}],
            "axioms": [],
            "instances": []
        },
        "metadata": {"operation": "addition", "sourceOntologies": ["A", "B"], "conflicts": [], "statistics": {}}
    });
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always(&response.to_string()));
    let request =
        OperationRequest::new(OperationKind::Addition, samples::person(), samples::ghg());

    let outcome = dispatcher.dispatch(&request).await.unwrap();

    let report = outcome.validation.clone().unwrap();
    assert_eq!(
        report.errors,
        ["Relation worksFor references unknown range class Company"]
    );
    assert_eq!(outcome.payload["validation"]["valid"], false);
    assert_eq!(outcome.payload["result"], response["result"]);
}

#[tokio::test]
async fn division_validation_is_merged_not_replaced() {
    let response = json!({
        "result": {"id": "", "name": "Unknown", "classes": [], "relations": [], "axioms": [], "instances": []},
        "analysis": {
            "uniqueToFull": {"classes": [], "relations": [], "instances": []},
            "inferredDomain": "emissions",
            "certainty": "low"
        },
        "validation": {"compositionCheck": "approximate", "discrepancies": []},
        "metadata": {"operation": "division", "alternativeSolutions": []}
    });
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always(&response.to_string()));
    let request =
        OperationRequest::new(OperationKind::Division, samples::ghg(), samples::factory());

    let outcome = dispatcher.dispatch(&request).await.unwrap();
    let validation = &outcome.payload["validation"];
    assert_eq!(validation["compositionCheck"], "approximate");
    assert_eq!(validation["valid"], false);
    assert_eq!(validation["errors"], json!(["Ontology must have an id"]));
    assert!(outcome.contract_gaps.is_empty());
}

#[tokio::test]
async fn missing_result_skips_validation_but_reports_gap() {
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always("{\"note\": \"no result\"}"));
    let request =
        OperationRequest::new(OperationKind::Subtraction, samples::person(), samples::person());

    let outcome = dispatcher.dispatch(&request).await.unwrap();
    assert!(outcome.validation.is_none());
    assert!(outcome.payload.get("validation").is_none());
    assert_eq!(outcome.contract_gaps.len(), 6);
    assert_eq!(outcome.contract_gaps[0], "missing required output result");
}

#[tokio::test]
async fn out_of_range_confidence_is_a_gap_not_an_error() {
    let response = json!({
        "result": {"id": "m", "name": "M"},
        "alignments": [{"sourceA": "Person", "sourceB": "Human", "confidence": 95}],
        "conflicts": [],
        "metadata": {"alignmentCount": 1, "conflictCount": 0}
    });
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always(&response.to_string()));

    let outcome = dispatcher.dispatch(&merge_request()).await.unwrap();
    assert_eq!(
        outcome.contract_gaps,
        ["alignments[0].confidence must be a number in [0, 1]"]
    );
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn missing_operand_never_reaches_collaborator() {
    let (dispatcher, mock) = dispatcher_with(MockCollaborator::always("{}"));
    let request = OperationRequest {
        ontology_b: None,
        ..merge_request()
    };

    let err = dispatcher.dispatch(&request).await.unwrap_err();
    assert!(matches!(
        err,
        OperationError::MissingOperand { operation: OperationKind::Merge, operand: "ontologyB" }
    ));
    assert!(err.is_caller_error());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn unknown_operation_rejected_before_dispatch() {
    let raw: RawOperationRequest = serde_json::from_value(json!({
        "operation": "quotient",
        "ontologyA": {"id": "a", "name": "A"},
        "ontologyB": {"id": "b", "name": "B"}
    }))
    .unwrap();
    assert!(matches!(
        raw.into_request(),
        Err(OperationError::UnknownOperation { .. })
    ));
}

#[tokio::test]
async fn unparseable_response_is_fatal() {
    let (dispatcher, _) = dispatcher_with(MockCollaborator::always("Sorry, I can't do that."));
    let err = dispatcher.dispatch(&merge_request()).await.unwrap_err();
    match err {
        OperationError::Extraction(e) => assert_eq!(e.raw, "Sorry, I can't do that."),
        other => panic!("expected extraction error, got {other:?}"),
    }
}

#[tokio::test]
async fn collaborator_errors_surface_unchanged() {
    let (dispatcher, _) = dispatcher_with(MockCollaborator::failing(
        CollaboratorError::RateLimited {
            retry_after_ms: 30_000,
        },
    ));
    let err = dispatcher.dispatch(&merge_request()).await.unwrap_err();
    assert!(matches!(
        err,
        OperationError::Collaborator(CollaboratorError::RateLimited { retry_after_ms: 30_000 })
    ));
    assert!(!err.is_caller_error());
}

#[tokio::test]
async fn cancellation_interrupts_in_flight_call() {
    let (dispatcher, mock) = dispatcher_with(MockCollaborator::hanging());
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let request = merge_request();
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        dispatcher.dispatch_with_cancellation(&request, &cancel),
    )
    .await
    .expect("dispatch should observe cancellation");

    assert!(matches!(result, Err(OperationError::Cancelled)));
    assert_eq!(mock.call_count(), 1);
}

// ============================================================================
// Offline mode, preview and status
// ============================================================================

#[tokio::test]
async fn offline_canned_response_follows_kind_not_text() {
    let dispatcher = OperationDispatcher::offline();

    // The sample ontologies mention neither "Addition" nor "Merge" in a way
    // that could steer selection; selection is by kind alone.
    for kind in OperationKind::ALL {
        let request = OperationRequest::new(kind, samples::factory(), samples::ghg());
        let outcome = dispatcher.dispatch(&request).await.unwrap();
        assert!(outcome.offline);
        let expected = match kind {
            OperationKind::Addition => "mock-addition-result",
            OperationKind::Merge => "mock-merge-result",
            _ => "mock-result",
        };
        assert_eq!(outcome.payload["result"]["id"], expected, "{kind}");
        assert!(outcome.validation.is_none());
    }
}

#[tokio::test]
async fn options_reach_the_collaborator_call() {
    let (dispatcher, mock) = dispatcher_with(MockCollaborator::always("{\"result\": null}"));
    let options = GenerationOptions {
        temperature: Some(0.9),
        max_tokens: Some(100),
    };
    let request = merge_request().with_options(options);
    dispatcher.dispatch(&request).await.unwrap();

    let sent = mock.options();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].temperature, Some(0.9));
    assert_eq!(sent[0].max_tokens, Some(100));
    assert_eq!(sent[0], options);
}

#[test]
fn render_previews_prompt_and_summaries() {
    let dispatcher = OperationDispatcher::offline();
    let mut a = Ontology::new("a", "Alpha");
    a.relations.push(Relation::object("knows", "Person", "Person"));
    let request = OperationRequest::new(OperationKind::Composition, a, samples::ghg())
        .with_auxiliary(json!({"from": "X", "to": "Y"}));

    let rendered = dispatcher.render(&request).unwrap();
    let summary_a = rendered.input_summary.ontology_a.clone().unwrap();
    assert_eq!(summary_a.relation_count, 1);
    assert_eq!(summary_a.class_count, 0);
    assert!(rendered.contract.prompt.contains("\"from\": \"X\""));

    let wire = serde_json::to_value(&rendered).unwrap();
    assert_eq!(wire["operation"], "composition");
    assert_eq!(wire["inputSummary"]["ontologyB"]["id"], "ghg-report");
    assert_eq!(wire["requiredOutput"][1], "interface.connections");
}

#[tokio::test]
async fn connection_status_offline_and_online() {
    let status = OperationDispatcher::offline().connection_status().await;
    assert!(status.connected);
    assert!(!status.has_api_key);

    let (dispatcher, _) = dispatcher_with(MockCollaborator::always(
        r#"{"status": "ok", "message": "test successful"}"#,
    ));
    let status = dispatcher.connection_status().await;
    assert!(status.connected);
    assert!(status.has_api_key);
    assert_eq!(status.provider, "mock");

    let wire = serde_json::to_value(&status).unwrap();
    assert_eq!(wire["hasApiKey"], true);

    let (dispatcher, _) = dispatcher_with(MockCollaborator::failing(CollaboratorError::Network(
        "connection refused".into(),
    )));
    assert!(!dispatcher.connection_status().await.connected);
}
