use chrono::DateTime;
use merlin_core::db::open_db_in_memory;
use merlin_core::{
    Cliente, InMemoryClienteRepository, InMemoryNotaRepository, InMemoryVeiculoRepository, Nota,
    NotaRepository, Parte, RepoError, SequentialIdGenerator, Servico, SqliteClienteRepository,
    SqliteNotaRepository, SqliteVeiculoRepository, Veiculo, WorkshopService,
};
use std::sync::Arc;

fn oil_change(cliente_id: &str, veiculo_id: &str) -> Nota {
    let data = DateTime::parse_from_rfc3339("2024-02-10T14:00:00Z").unwrap();
    Nota::new(cliente_id, veiculo_id, data, 150.0)
        .with_servico(Servico::new("Oil change", 50.0))
        .with_parte(Parte::new("Filter", 20.0, 1))
}

#[test]
fn service_over_sqlite_handles_full_workflow() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkshopService::new(
        SqliteClienteRepository::try_new(&conn).unwrap(),
        SqliteVeiculoRepository::try_new(&conn).unwrap(),
        SqliteNotaRepository::try_new(&conn).unwrap(),
    );

    let mut cliente = Cliente::new("Ana Souza", "11 99999-0000", "ana@example.com");
    let cliente_id = service.create_cliente(&mut cliente).unwrap();
    let mut veiculo = Veiculo::new(&cliente_id, "Fiat", "Uno", 2012, "ABC1D23");
    let veiculo_id = service.create_veiculo(&mut veiculo).unwrap();

    let mut nota = oil_change(&cliente_id, &veiculo_id);
    let nota_id = service.create_nota(&mut nota).unwrap();
    assert_eq!(service.get_nota(&nota_id).unwrap(), Some(nota.clone()));

    nota.servicos.clear();
    service.update_nota(&nota).unwrap();
    let loaded = service.get_nota(&nota_id).unwrap().unwrap();
    assert!(loaded.servicos.is_empty());
    assert_eq!(loaded.partes.len(), 1);

    assert_eq!(
        service.list_veiculos_by_cliente(&cliente_id).unwrap(),
        vec![veiculo]
    );
    assert_eq!(service.list_notas().unwrap().len(), 1);

    service.delete_nota(&nota_id).unwrap();
    service.delete_veiculo(&veiculo_id).unwrap();
    service.delete_cliente(&cliente_id).unwrap();
    assert!(service.list_notas().unwrap().is_empty());
    assert!(service.list_clientes().unwrap().is_empty());
    assert!(service.get_cliente(&cliente_id).unwrap().is_none());
}

#[test]
fn service_propagates_repository_failures() {
    let conn = open_db_in_memory().unwrap();
    let service = WorkshopService::new(
        SqliteClienteRepository::try_new(&conn).unwrap(),
        SqliteVeiculoRepository::try_new(&conn).unwrap(),
        SqliteNotaRepository::try_new(&conn).unwrap(),
    );

    let mut cliente = Cliente::new("Bia", "", "");
    let cliente_id = service.create_cliente(&mut cliente).unwrap();
    let mut veiculo = Veiculo::new(&cliente_id, "Renault", "Sandero", 2016, "SAN2016");
    service.create_veiculo(&mut veiculo).unwrap();
    let mut nota = oil_change(&cliente_id, &veiculo.id);
    service.create_nota(&mut nota).unwrap();

    // The client still owns a vehicle and an invoice.
    let err = service.delete_cliente(&cliente_id).unwrap_err();
    assert!(matches!(err, RepoError::Storage { entity: "cliente", .. }));

    let mut stale = nota.clone();
    stale.id = "gone".to_string();
    assert!(matches!(
        service.update_nota(&stale),
        Err(RepoError::NotFound { entity: "nota", .. })
    ));
}

#[test]
fn service_over_in_memory_fakes() {
    let notas = InMemoryNotaRepository::with_id_generator(Arc::new(SequentialIdGenerator::new(
        "nota",
    )));
    let observer = notas.clone();
    let service = WorkshopService::new(
        InMemoryClienteRepository::with_id_generator(SequentialIdGenerator::new("cliente")),
        InMemoryVeiculoRepository::with_id_generator(SequentialIdGenerator::new("veiculo")),
        notas,
    );

    let cliente_id = service
        .create_cliente(&mut Cliente::new("Caio", "", ""))
        .unwrap();
    assert_eq!(cliente_id, "cliente-1");
    let veiculo_id = service
        .create_veiculo(&mut Veiculo::new(&cliente_id, "Toyota", "Corolla", 2020, "COR2020"))
        .unwrap();
    assert_eq!(veiculo_id, "veiculo-1");

    let mut nota = oil_change(&cliente_id, &veiculo_id);
    assert_eq!(service.create_nota(&mut nota).unwrap(), "nota-1");
    assert_eq!(observer.get_by_id("nota-1").unwrap(), Some(nota.clone()));

    nota.partes = vec![Parte::new("Filtro de ar", 45.0, 1), Parte::new("Oleo 5W30", 38.0, 4)];
    service.update_nota(&nota).unwrap();
    assert_eq!(observer.get_by_id("nota-1").unwrap().unwrap().partes.len(), 2);

    service.delete_nota("nota-1").unwrap();
    service.delete_nota("nota-1").unwrap();
    assert!(service.get_nota("nota-1").unwrap().is_none());
    assert!(service.list_notas().unwrap().is_empty());
    assert!(service.list_veiculos_by_cliente("cliente-2").unwrap().is_empty());
}
