use chrono::DateTime;
use merlin_core::{Cliente, Nota, Parte, Servico};

#[test]
fn nota_serializes_date_as_rfc3339_and_children_inline() {
    let data = DateTime::parse_from_rfc3339("2024-05-17T09:30:00-03:00").unwrap();
    let mut nota = Nota::new("cliente-1", "veiculo-1", data, 150.0)
        .with_servico(Servico::new("Oil change", 50.0))
        .with_parte(Parte::new("Filter", 20.0, 1));
    nota.id = "nota-1".to_string();

    let json = serde_json::to_value(&nota).unwrap();
    assert_eq!(json["id"], "nota-1");
    assert_eq!(json["data"], "2024-05-17T09:30:00-03:00");
    assert_eq!(json["custo_total"], 150.0);
    assert_eq!(json["servicos"][0]["descricao"], "Oil change");
    assert_eq!(json["partes"][0]["quantidade"], 1);

    let back: Nota = serde_json::from_value(json).unwrap();
    assert_eq!(back, nota);
}

#[test]
fn new_entities_start_without_id() {
    assert!(Cliente::new("Ana", "", "").id.is_empty());
    let data = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap();
    let nota = Nota::new("c", "v", data, 0.0);
    assert!(nota.id.is_empty());
    assert!(nota.servicos.is_empty());
    assert!(nota.partes.is_empty());
}
