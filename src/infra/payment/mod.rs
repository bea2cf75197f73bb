pub mod esewa_signer;
