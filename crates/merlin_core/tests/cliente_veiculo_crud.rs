use merlin_core::db::open_db_in_memory;
use merlin_core::{
    Cliente, ClienteRepository, RepoError, RepoStep, SequentialIdGenerator,
    SqliteClienteRepository, SqliteVeiculoRepository, Veiculo, VeiculoRepository,
};

#[test]
fn cliente_create_get_update_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClienteRepository::try_new(&conn).unwrap();

    let mut cliente = Cliente::new("Bruno Lima", "21 98888-1111", "bruno@example.com");
    cliente.id = "ignored".to_string();
    let id = repo.create(&mut cliente).unwrap();
    assert_ne!(id, "ignored");
    assert_eq!(repo.get_by_id(&id).unwrap(), Some(cliente.clone()));

    cliente.telefone = "21 97777-2222".to_string();
    repo.update(&cliente).unwrap();
    assert_eq!(
        repo.get_by_id(&id).unwrap().unwrap().telefone,
        "21 97777-2222"
    );
}

#[test]
fn cliente_lookup_miss_and_idempotent_delete() {
    let conn = open_db_in_memory().unwrap();
    let repo =
        SqliteClienteRepository::with_id_generator(&conn, SequentialIdGenerator::new("c")).unwrap();

    assert!(repo.get_by_id("c-1").unwrap().is_none());

    let mut cliente = Cliente::new("Carla", "", "");
    assert_eq!(repo.create(&mut cliente).unwrap(), "c-1");
    repo.delete("c-1").unwrap();
    repo.delete("c-1").unwrap();
    assert!(repo.list().unwrap().is_empty());
}

#[test]
fn cliente_update_missing_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClienteRepository::try_new(&conn).unwrap();

    let mut cliente = Cliente::new("Davi", "", "");
    cliente.id = "missing".to_string();
    let err = repo.update(&cliente).unwrap_err();
    assert!(matches!(err, RepoError::NotFound { entity: "cliente", .. }));
}

#[test]
fn cliente_list_returns_all_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteClienteRepository::try_new(&conn).unwrap();

    for nome in ["Eva", "Fabio", "Gil"] {
        repo.create(&mut Cliente::new(nome, "", "")).unwrap();
    }

    let mut nomes: Vec<_> = repo
        .list()
        .unwrap()
        .into_iter()
        .map(|cliente| cliente.nome)
        .collect();
    nomes.sort();
    assert_eq!(nomes, ["Eva", "Fabio", "Gil"]);
}

#[test]
fn veiculos_are_listed_by_owner() {
    let conn = open_db_in_memory().unwrap();
    let clientes = SqliteClienteRepository::try_new(&conn).unwrap();
    let veiculos = SqliteVeiculoRepository::try_new(&conn).unwrap();

    let owner = clientes
        .create(&mut Cliente::new("Helena", "", ""))
        .unwrap();
    let other = clientes.create(&mut Cliente::new("Igor", "", "")).unwrap();

    let mut gol = Veiculo::new(&owner, "VW", "Gol", 2015, "GOL2015");
    let mut civic = Veiculo::new(&owner, "Honda", "Civic", 2019, "CIV2019");
    let mut onix = Veiculo::new(&other, "Chevrolet", "Onix", 2021, "ONX2021");
    veiculos.create(&mut gol).unwrap();
    veiculos.create(&mut civic).unwrap();
    veiculos.create(&mut onix).unwrap();

    let mut owned = veiculos.list_by_cliente_id(&owner).unwrap();
    owned.sort_by(|a, b| a.placa.cmp(&b.placa));
    assert_eq!(owned, vec![civic, gol]);
    assert!(veiculos.list_by_cliente_id("nobody").unwrap().is_empty());
}

#[test]
fn veiculo_update_and_delete() {
    let conn = open_db_in_memory().unwrap();
    let clientes = SqliteClienteRepository::try_new(&conn).unwrap();
    let veiculos = SqliteVeiculoRepository::try_new(&conn).unwrap();

    let owner = clientes.create(&mut Cliente::new("Joao", "", "")).unwrap();
    let mut veiculo = Veiculo::new(&owner, "Ford", "Ka", 2010, "KAA2010");
    let id = veiculos.create(&mut veiculo).unwrap();

    veiculo.placa = "KAB1C10".to_string();
    veiculos.update(&veiculo).unwrap();
    assert_eq!(veiculos.get_by_id(&id).unwrap(), Some(veiculo));

    veiculos.delete(&id).unwrap();
    veiculos.delete(&id).unwrap();
    assert!(veiculos.get_by_id(&id).unwrap().is_none());
}

#[test]
fn veiculo_requires_existing_owner() {
    let conn = open_db_in_memory().unwrap();
    let veiculos = SqliteVeiculoRepository::try_new(&conn).unwrap();

    let mut veiculo = Veiculo::new("ghost", "Fiat", "Palio", 2008, "PAL2008");
    let err = veiculos.create(&mut veiculo).unwrap_err();

    assert_eq!(err.step(), Some(RepoStep::HeaderWrite));
    assert!(err.to_string().contains(&veiculo.id));
}
