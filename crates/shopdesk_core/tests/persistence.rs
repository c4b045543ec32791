use chrono::NaiveDateTime;
use shopdesk_core::model::TIMESTAMP_FORMAT;
use shopdesk_core::{
    CrmBook, CrmRepository, JsonFileCrmRepository, RepoError, SaleLine, StoreError, StoreManager,
};
use std::path::PathBuf;

fn data_file(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

#[test]
fn missing_files_load_as_empty_books() {
    let dir = tempfile::tempdir().unwrap();

    let book = CrmBook::load_from(data_file(&dir, "veriler.json")).unwrap();
    assert!(book.is_empty());

    let manager = StoreManager::load_from(data_file(&dir, "store_data.json")).unwrap();
    assert!(manager.customers().is_empty());
    assert!(manager.instruments().is_empty());
}

#[test]
fn crm_round_trip_preserves_ids_fields_and_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "veriler.json");

    let mut book = CrmBook::new();
    let ayse = book
        .add_customer("Ayşe", "Çelik", "05005556677", "ayse@example.com")
        .unwrap();
    let mehmet = book
        .add_customer("Mehmet", "Öz", "05321112233", "mehmet@example.com")
        .unwrap();
    book.add_sale(ayse, "Telefon", 1, 12000.0).unwrap();
    book.add_sale(ayse, "Kulaklık", 2, 1500.5).unwrap();
    book.add_support_request(mehmet, "Teslimat", "Kargo ne zaman gelir?")
        .unwrap();
    book.save_to(&path).unwrap();

    let loaded = CrmBook::load_from(&path).unwrap();
    assert_eq!(loaded.customers(), book.customers());

    let original = book.customer(ayse).unwrap();
    let restored = loaded.customer(ayse).unwrap();
    for (before, after) in original.sales().iter().zip(restored.sales()) {
        assert_eq!(before.id(), after.id());
        assert_eq!(before.created_at(), after.created_at());
        NaiveDateTime::parse_from_str(after.created_at(), TIMESTAMP_FORMAT).unwrap();
    }
    let request = &loaded.customer(mehmet).unwrap().support_requests()[0];
    assert_eq!(
        request.id(),
        book.customer(mehmet).unwrap().support_requests()[0].id()
    );
    assert_eq!(request.status, "Açık");
}

#[test]
fn crm_loads_file_written_in_original_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "veriler.json");
    std::fs::write(
        &path,
        r#"[
  {
    "musteri_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "ad": "Ayşe",
    "soyad": "Çelik",
    "telefon": "05005556677",
    "email": "ayse@example.com",
    "satislar": [
      {
        "satis_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
        "tarih": "2024-05-01 14:03:22",
        "urun": "Telefon",
        "miktar": 1,
        "toplam_tutar": 12000
      }
    ],
    "destek_talepleri": [
      {
        "talep_id": "16fd2706-8baf-433b-82eb-8c7fada847da",
        "konu": "Teslimat",
        "aciklama": "Kargo ne zaman gelir?",
        "tarih": "2024-05-02 09:00:00",
        "durum": "Açık"
      }
    ]
  }
]"#,
    )
    .unwrap();

    let book = CrmBook::load_from(&path).unwrap();
    let customer = &book.customers()[0];
    assert_eq!(
        customer.id().to_string(),
        "0f8fad5b-d9cb-469f-a165-70867728950e"
    );
    assert_eq!(customer.sales()[0].created_at(), "2024-05-01 14:03:22");
    assert_eq!(customer.sales()[0].total_amount, 12000.0);
    assert_eq!(
        customer.support_requests()[0].id().to_string(),
        "16fd2706-8baf-433b-82eb-8c7fada847da"
    );
    assert_eq!(book.total_sales_amount(), 12000.0);
}

#[test]
fn crm_loads_records_the_original_forms_let_through() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileCrmRepository::new(data_file(&dir, "veriler.json"));
    std::fs::write(
        repo.path(),
        r#"[{"musteri_id": "0f8fad5b-d9cb-469f-a165-70867728950e", "ad": "", "soyad": "Ç",
            "telefon": "1", "email": "a@b",
            "satislar": [{"satis_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7",
                          "tarih": "2024-05-01 14:03:22", "urun": "", "miktar": -1,
                          "toplam_tutar": -250}],
            "destek_talepleri": []}]"#,
    )
    .unwrap();

    let customers = repo.load().unwrap();
    let sale = &customers[0].sales()[0];
    assert_eq!(customers[0].first_name, "");
    assert_eq!(sale.product, "");
    assert_eq!(sale.quantity, -1);
    assert_eq!(sale.total_amount, -250.0);

    let book = CrmBook::load_from(repo.path()).unwrap();
    assert_eq!(book.total_sales_amount(), -250.0);
}

#[test]
fn crm_load_still_rejects_duplicate_sale_ids() {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonFileCrmRepository::new(data_file(&dir, "veriler.json"));
    std::fs::write(
        repo.path(),
        r#"[{"musteri_id": "0f8fad5b-d9cb-469f-a165-70867728950e", "ad": "A", "soyad": "B",
            "telefon": "1", "email": "a@b",
            "satislar": [
              {"satis_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7", "tarih": "t",
               "urun": "Telefon", "miktar": 1, "toplam_tutar": 1},
              {"satis_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7", "tarih": "t",
               "urun": "Telefon", "miktar": 1, "toplam_tutar": 1}
            ],
            "destek_talepleri": []}]"#,
    )
    .unwrap();

    assert!(matches!(repo.load(), Err(RepoError::InvalidData(_))));
}

#[test]
fn store_round_trip_reconstructs_sales_and_supports() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "store_data.json");

    let mut manager = StoreManager::new();
    let guitar = manager.add_instrument("Gitar", 5).unwrap().id();
    let saz = manager.add_instrument("Bağlama", 3).unwrap().id();
    let customer = manager
        .add_customer("Deniz", "Ak", "05321234567", "deniz@example.com")
        .unwrap()
        .id();
    let sale = manager
        .add_sale(
            customer,
            &[SaleLine::new(guitar, 2, 3000.0), SaleLine::new(saz, 1, 2500.0)],
        )
        .unwrap()
        .id();
    let request = manager
        .add_support_request(customer, "Akort", "Bağlamanın burgusu gevşek")
        .unwrap()
        .id();
    manager.save_to(&path).unwrap();

    let loaded = StoreManager::load_from(&path).unwrap();
    assert_eq!(loaded.snapshot(), manager.snapshot());
    assert_eq!(loaded.instrument(guitar).unwrap().stock(), 3);
    assert_eq!(loaded.sale(sale).unwrap().total(), 8500.0);
    assert_eq!(loaded.customer(customer).unwrap().order_ids(), &[sale]);
    assert_eq!(loaded.customer(customer).unwrap().support_ids(), &[request]);
    assert_eq!(loaded.total_sales_amount(), 8500.0);
}

#[test]
fn store_file_uses_four_top_level_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "store_data.json");

    let mut manager = StoreManager::new();
    let piano = manager.add_instrument("Piyano", 1).unwrap().id();
    let customer = manager.add_customer("Can", "Er", "1", "c@e").unwrap().id();
    manager
        .add_sale(customer, &[SaleLine::new(piano, 1, 50000.0)])
        .unwrap();
    manager.save_to(&path).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["instruments"][0]["instrument_id"], piano.to_string());
    assert_eq!(json["instruments"][0]["stock"], 0);
    assert_eq!(json["customers"][0]["orders"][0]["total"], 50000.0);
    assert_eq!(json["sales"][0]["items"][0]["qty"], 1);
    assert_eq!(json["sales"][0]["items"][0]["price"], 50000.0);
    assert_eq!(json["supports"], serde_json::json!([]));
}

#[test]
fn store_load_rejects_dangling_customer_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "store_data.json");
    std::fs::write(
        &path,
        r#"{
  "instruments": [],
  "customers": [{
    "customer_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "first_name": "Can", "last_name": "Er", "phone": "1", "email": "c@e",
    "orders": [{"sale_id": "7c9e6679-7425-40de-944b-e07fc1f90ae7"}],
    "supports": []
  }],
  "sales": [],
  "supports": []
}"#,
    )
    .unwrap();

    let err = StoreManager::load_from(&path).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Persistence(RepoError::InvalidData(_))
    ));
}

#[test]
fn store_loads_zero_quantity_sale_and_blank_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "store_data.json");
    std::fs::write(
        &path,
        r#"{
  "instruments": [
    {"instrument_id": "31111111-2222-4333-8444-555555555555", "name": "", "stock": 2}
  ],
  "customers": [{
    "customer_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "first_name": "Can", "last_name": "", "phone": "1", "email": "c@e",
    "orders": [{"sale_id": "21111111-2222-4333-8444-555555555555"}],
    "supports": [{"request_id": "41111111-2222-4333-8444-555555555555"}]
  }],
  "sales": [{
    "sale_id": "21111111-2222-4333-8444-555555555555",
    "customer_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "date": "2024-01-01 10:00:00",
    "items": [{"instrument_id": "31111111-2222-4333-8444-555555555555", "qty": 0, "price": 3000}],
    "total": 0
  }],
  "supports": [{
    "request_id": "41111111-2222-4333-8444-555555555555",
    "customer_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "subject": "", "message": "", "date": "2024-01-02 09:00:00", "status": "Open"
  }]
}"#,
    )
    .unwrap();

    let manager = StoreManager::load_from(&path).unwrap();
    let sale = &manager.sales()[0];
    assert_eq!(sale.items()[0].quantity, 0);
    assert_eq!(sale.total(), 0.0);
    assert_eq!(manager.instruments()[0].stock(), 2);
    assert_eq!(manager.support_requests()[0].subject, "");
    assert_eq!(manager.customers()[0].order_ids().len(), 1);
}

#[test]
fn store_loads_negative_stock_and_refuses_to_sell_from_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = data_file(&dir, "store_data.json");
    std::fs::write(
        &path,
        r#"{
  "instruments": [
    {"instrument_id": "31111111-2222-4333-8444-555555555555", "name": "Ud", "stock": -3}
  ],
  "customers": [{
    "customer_id": "0f8fad5b-d9cb-469f-a165-70867728950e",
    "first_name": "Can", "last_name": "Er", "phone": "1", "email": "c@e"
  }]
}"#,
    )
    .unwrap();

    let mut manager = StoreManager::load_from(&path).unwrap();
    let oud = manager.instruments()[0].id();
    let customer = manager.customers()[0].id();
    assert_eq!(manager.instrument(oud).unwrap().stock(), -3);

    let err = manager
        .add_sale(customer, &[SaleLine::new(oud, 1, 100.0)])
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::InsufficientStock { requested: 1, available: -3, .. }
    ));
}

#[test]
fn save_failure_is_reported_without_touching_the_book() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing-dir").join("veriler.json");

    let mut book = CrmBook::new();
    book.add_customer("A", "A", "1", "a@x").unwrap();
    let err = book.save_to(&path).unwrap_err();

    assert!(matches!(err, StoreError::Persistence(RepoError::Io { .. })));
    assert_eq!(book.len(), 1);
}
