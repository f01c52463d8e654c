use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// Helper de concorrência: a "chave" de exclusão mútua por franquia
// ---

/// Deriva a chave i64 do advisory lock a partir do UUID da franquia.
/// Determinística: os 8 primeiros bytes do UUID, big-endian.
pub(crate) fn franchise_lock_key(franchise_id: Uuid) -> i64 {
    let bytes = franchise_id.as_bytes();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    i64::from_be_bytes(buf)
}

/// Serializa as operações concorrentes sobre o conjunto de pedidos/saques
/// de uma franquia. Só tem efeito dentro de uma transação aberta; o lock é
/// liberado automaticamente no COMMIT ou ROLLBACK.
pub(crate) async fn lock_franchise<'e, E>(executor: E, franchise_id: Uuid) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(franchise_lock_key(franchise_id))
        .execute(executor)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chave_do_lock_e_deterministica() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(franchise_lock_key(id), franchise_lock_key(id));
    }

    #[test]
    fn chave_do_lock_vem_dos_primeiros_bytes() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let esperado = i64::from_be_bytes([0x55, 0x0e, 0x84, 0x00, 0xe2, 0x9b, 0x41, 0xd4]);
        assert_eq!(franchise_lock_key(id), esperado);
    }

    #[test]
    fn uuids_diferentes_geram_chaves_diferentes() {
        let a = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        let b = Uuid::parse_str("660e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_ne!(franchise_lock_key(a), franchise_lock_key(b));
    }
}
