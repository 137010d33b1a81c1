pub mod d400_geography;
